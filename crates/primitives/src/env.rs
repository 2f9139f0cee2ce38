//! Block, transaction and configuration environment supplied to a top-level
//! frame by the host.

use crate::{
    constants::{DEFAULT_ANALYSIS_CACHE_SIZE, DEFAULT_MEMORY_LIMIT},
    hardfork::SpecId,
};
use alloy_primitives::{Address, B256, U256};

/// Complete environment of a transaction: chain configuration, block context
/// and transaction context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Env {
    pub cfg: CfgEnv,
    pub block: BlockEnv,
    pub tx: TxEnv,
}

/// Chain and engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgEnv {
    /// Chain ID pushed by the `CHAINID` opcode.
    pub chain_id: u64,
    /// Active hardfork.
    pub spec: SpecId,
    /// Cap on the shared memory buffer per transaction.
    pub memory_limit: u64,
    /// Override for the EIP-170 deployed code size limit.
    pub limit_contract_code_size: Option<usize>,
    /// Disables peephole fusion in the bytecode analyzer. Execution semantics
    /// are identical either way.
    pub disable_fusion: bool,
    /// Number of analyzed streams kept by the analysis cache.
    pub analysis_cache_size: usize,
}

impl Default for CfgEnv {
    fn default() -> Self {
        Self {
            chain_id: 1,
            spec: SpecId::default(),
            memory_limit: DEFAULT_MEMORY_LIMIT,
            limit_contract_code_size: None,
            disable_fusion: false,
            analysis_cache_size: DEFAULT_ANALYSIS_CACHE_SIZE,
        }
    }
}

impl CfgEnv {
    /// Returns the effective EIP-170 deployed code size limit.
    #[inline]
    pub fn max_code_size(&self) -> usize {
        self.limit_contract_code_size
            .unwrap_or(crate::constants::MAX_CODE_SIZE)
    }

    /// Returns the effective EIP-3860 init code size limit.
    #[inline]
    pub fn max_initcode_size(&self) -> usize {
        self.limit_contract_code_size
            .map(|limit| limit.saturating_mul(2))
            .unwrap_or(crate::constants::MAX_INITCODE_SIZE)
    }
}

/// Block context of the executing transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockEnv {
    pub number: u64,
    pub timestamp: u64,
    pub gas_limit: u64,
    /// Beneficiary of the block, pushed by `COINBASE`.
    pub coinbase: Address,
    /// Pre-merge difficulty. Pushed by `DIFFICULTY` before the merge.
    pub difficulty: U256,
    /// Post-merge randomness beacon, pushed by `DIFFICULTY`/`PREVRANDAO`
    /// from the merge onward.
    pub prevrandao: Option<B256>,
    /// EIP-1559 base fee.
    pub basefee: u64,
    /// EIP-4844 blob base fee, pushed by `BLOBBASEFEE`.
    pub blob_base_fee: u128,
}

/// Transaction context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxEnv {
    /// Transaction origin, pushed by `ORIGIN`.
    pub caller: Address,
    /// Effective gas price, pushed by `GASPRICE`.
    pub gas_price: u128,
    /// EIP-4844 versioned blob hashes, indexed by `BLOBHASH`.
    pub blob_hashes: Vec<B256>,
}
