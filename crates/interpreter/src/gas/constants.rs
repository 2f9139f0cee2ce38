/// Gas cost of zero-cost operations.
pub const ZERO: u64 = 0;
/// Base gas cost for cheap environment reads.
pub const BASE: u64 = 2;
/// Gas cost of very low-cost operations.
pub const VERYLOW: u64 = 3;
/// Gas cost of low-cost operations.
pub const LOW: u64 = 5;
/// Gas cost of medium-cost operations.
pub const MID: u64 = 8;
/// Gas cost of high-cost operations.
pub const HIGH: u64 = 10;
/// Gas cost of the `JUMPDEST` instruction.
pub const JUMPDEST: u64 = 1;
/// Refund for `SELFDESTRUCT` before EIP-3529 removed it.
pub const SELFDESTRUCT: i64 = 24000;
/// Base gas cost of `CREATE`.
pub const CREATE: u64 = 32000;
/// Surcharge when a call transfers value.
pub const CALLVALUE: u64 = 9000;
/// Surcharge for creating a new account.
pub const NEWACCOUNT: u64 = 25000;
/// Base gas cost of `EXP`.
pub const EXP: u64 = 10;
/// Gas per word of memory expansion.
pub const MEMORY: u64 = 3;
/// Base gas cost of `LOG`.
pub const LOG: u64 = 375;
/// Gas per byte of `LOG` data.
pub const LOGDATA: u64 = 8;
/// Gas per `LOG` topic.
pub const LOGTOPIC: u64 = 375;
/// Base gas cost of `KECCAK256`.
pub const KECCAK256: u64 = 30;
/// Gas per word hashed by `KECCAK256`.
pub const KECCAK256WORD: u64 = 6;
/// Gas per word for copy operations.
pub const COPY: u64 = 3;
/// Gas cost of `BLOCKHASH`.
pub const BLOCKHASH: u64 = 20;
/// Gas per byte of deployed code at contract creation.
pub const CODEDEPOSIT: u64 = 200;

/// Gas cost of `SSTORE` setting a slot from zero to non-zero.
pub const SSTORE_SET: u64 = 20000;
/// Gas cost of `SSTORE` modifying an existing non-zero slot.
pub const SSTORE_RESET: u64 = 5000;
/// Refund for clearing a slot, before EIP-3529 reduced it.
pub const REFUND_SSTORE_CLEARS: i64 = 15000;
/// EIP-1884 `SLOAD` price.
pub const ISTANBUL_SLOAD_GAS: u64 = 800;

// Berlin EIP-2929 constants.
/// Access-list cost per address.
pub const ACCESS_LIST_ADDRESS: u64 = 2400;
/// Access-list cost per storage key.
pub const ACCESS_LIST_STORAGE_KEY: u64 = 1900;
/// Cost of a cold `SLOAD`.
pub const COLD_SLOAD_COST: u64 = 2100;
/// Cost of a cold account access.
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
/// Cost of a warm storage read.
pub const WARM_STORAGE_READ_COST: u64 = 100;
/// `SSTORE` reset cost on a warm slot.
pub const WARM_SSTORE_RESET: u64 = SSTORE_RESET - COLD_SLOAD_COST;

/// Surcharge a handler adds on top of the warm base already charged at
/// block entry when a storage slot turns out to be cold.
pub const COLD_SLOAD_SURCHARGE: u64 = COLD_SLOAD_COST - WARM_STORAGE_READ_COST;
/// Surcharge a handler adds on top of the warm base when an account access
/// turns out to be cold.
pub const COLD_ACCOUNT_SURCHARGE: u64 = COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST;

/// EIP-3860: gas per word of init code.
pub const INITCODE_WORD_COST: u64 = 2;

/// Gas stipend handed to the recipient of a value-bearing call.
pub const CALL_STIPEND: u64 = 2300;
