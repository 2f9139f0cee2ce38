use alloy_primitives::{b256, B256};

/// Interpreter stack limit in words.
pub const STACK_LIMIT: usize = 1024;

/// Maximum call depth. A call at depth 1024 succeeds, 1025 fails.
pub const CALL_STACK_LIMIT: usize = 1024;

/// EIP-170: maximum deployed contract code size in bytes.
pub const MAX_CODE_SIZE: usize = 0x6000;

/// EIP-3860: maximum init code size, double the deployed limit.
pub const MAX_INITCODE_SIZE: usize = 2 * MAX_CODE_SIZE;

/// Number of most recent blocks addressable by `BLOCKHASH`.
pub const BLOCK_HASH_HISTORY: u64 = 256;

/// Default cap on the shared memory buffer per transaction (16 MiB).
pub const DEFAULT_MEMORY_LIMIT: u64 = 16 * 1024 * 1024;

/// Default number of entries kept by the bytecode analysis cache.
pub const DEFAULT_ANALYSIS_CACHE_SIZE: usize = 256;

/// keccak256 of empty input, the code hash of accounts without code.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// keccak256 of the RLP encoding of the empty trie, the storage root of a
/// fresh account.
pub const EMPTY_STORAGE_ROOT: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");
