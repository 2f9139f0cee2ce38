//! # irevm-state
//!
//! Accounts, storage, transient storage and code, behind a journal with
//! nested checkpoints. Reads cascade from the local caches through an
//! optional fork backend; writes only ever touch the caches and are undone
//! by reverting to a checkpoint.

pub mod account;
pub mod backend;
pub mod journal;

pub use account::{Account, AccountInfo, AccountStatus, StorageSlot};
pub use backend::{BackendError, EmptyBackend, StateBackend};
pub use journal::{
    InvalidSnapshot, JournalCheckpoint, SnapshotId, StateJournal, TransferError,
};

use primitives::U256;

/// A value loaded from state together with its EIP-2929 temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateLoad<T> {
    /// The loaded value.
    pub data: T,
    /// Whether this was the first access in the transaction.
    pub is_cold: bool,
}

impl<T> StateLoad<T> {
    /// Creates a new loaded value.
    #[inline]
    pub fn new(data: T, is_cold: bool) -> Self {
        Self { data, is_cold }
    }

    /// Maps the inner value, keeping the temperature.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StateLoad<U> {
        StateLoad {
            data: f(self.data),
            is_cold: self.is_cold,
        }
    }
}

/// Value triple observed by an `SSTORE`, feeding EIP-2200/3529 net metering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SStoreResult {
    /// Value of the slot at the start of the transaction.
    pub original_value: U256,
    /// Value of the slot before this store.
    pub present_value: U256,
    /// Value written by this store.
    pub new_value: U256,
}

/// Outcome of a `SELFDESTRUCT`, feeding its gas calculation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelfDestructResult {
    /// Whether the destroyed account held a balance.
    pub had_value: bool,
    /// Whether the beneficiary exists (state-clear aware).
    pub target_exists: bool,
    /// Whether the account was already queued for destruction.
    pub previously_destroyed: bool,
}
