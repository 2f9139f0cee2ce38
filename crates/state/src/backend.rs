//! Read-only interface to the persistent or forked state behind the journal.

use crate::account::AccountInfo;
use core::fmt;
use primitives::{keccak256, Address, Bytes, B256, U256};

/// Failure of a backend fetch. Both variants are transaction-fatal: the
/// journal itself never fails.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackendError {
    /// The data is being fetched asynchronously. The host drives the request
    /// with this id to completion and retries the transaction.
    Pending(u64),
    /// The backend is unreachable or returned a hard failure.
    Failed(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(id) => write!(f, "backend request {id} pending"),
            Self::Failed(msg) => write!(f, "backend failed: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Read-through state source consulted on journal cache misses.
///
/// Implementations may answer synchronously or surface
/// [`BackendError::Pending`] with a request id the host resolves out of
/// band.
pub trait StateBackend {
    /// Basic account fields, or `None` if the account does not exist.
    fn basic(&self, address: Address) -> Result<Option<AccountInfo>, BackendError>;

    /// Code by its hash. Only called for hashes previously reported by
    /// [`Self::basic`].
    fn code_by_hash(&self, code_hash: B256) -> Result<Bytes, BackendError>;

    /// Value of a storage slot; zero if unset.
    fn storage(&self, address: Address, index: U256) -> Result<U256, BackendError>;

    /// Hash of the block with the given number.
    fn block_hash(&self, number: u64) -> Result<B256, BackendError>;
}

/// Backend with no state at all. Every account is absent, every slot zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyBackend;

impl StateBackend for EmptyBackend {
    fn basic(&self, _address: Address) -> Result<Option<AccountInfo>, BackendError> {
        Ok(None)
    }

    fn code_by_hash(&self, _code_hash: B256) -> Result<Bytes, BackendError> {
        Ok(Bytes::new())
    }

    fn storage(&self, _address: Address, _index: U256) -> Result<U256, BackendError> {
        Ok(U256::ZERO)
    }

    fn block_hash(&self, number: u64) -> Result<B256, BackendError> {
        Ok(keccak256(number.to_be_bytes()))
    }
}
