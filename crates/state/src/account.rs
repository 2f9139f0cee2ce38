//! Account and storage slot representations.

use primitives::{Bytes, SpecId, B256, U256, EMPTY_STORAGE_ROOT, KECCAK_EMPTY};

/// Core account fields, as the backend reports them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountInfo {
    /// Account balance in wei.
    pub balance: U256,
    /// Account nonce.
    pub nonce: u64,
    /// keccak256 of the account's code; [`KECCAK_EMPTY`] if none.
    pub code_hash: B256,
    /// Root of the account's storage trie. Owned by the backend; carried
    /// through unchanged.
    pub storage_root: B256,
    /// The code itself, lazily attached on first use.
    pub code: Option<Bytes>,
}

impl Default for AccountInfo {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code_hash: KECCAK_EMPTY,
            storage_root: EMPTY_STORAGE_ROOT,
            code: None,
        }
    }
}

impl AccountInfo {
    /// Account with the given balance and nothing else.
    pub fn from_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Whether the account carries code.
    #[inline]
    pub fn has_code(&self) -> bool {
        self.code_hash != KECCAK_EMPTY
    }

    /// Whether the account is empty per EIP-161: no code, zero nonce, zero
    /// balance.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code_hash == KECCAK_EMPTY
    }
}

bitflags::bitflags! {
    /// Per-transaction lifecycle marks of a cached account.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AccountStatus: u8 {
        /// Created in the current transaction. Gates EIP-6780 deletion and
        /// lets SLOAD skip the backend.
        const Created = 0b0001;
        /// Queued for destruction at transaction end.
        const SelfDestructed = 0b0010;
        /// Touched by the current transaction.
        const Touched = 0b0100;
        /// The backend reported no such account.
        const LoadedAsNotExisting = 0b1000;
    }
}

/// An account as cached by the journal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    pub info: AccountInfo,
    pub status: AccountStatus,
}

impl From<AccountInfo> for Account {
    fn from(info: AccountInfo) -> Self {
        Self {
            info,
            status: AccountStatus::default(),
        }
    }
}

impl Account {
    /// Cache entry for an address the backend knows nothing about.
    pub fn new_not_existing() -> Self {
        Self {
            info: AccountInfo::default(),
            status: AccountStatus::LoadedAsNotExisting,
        }
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.status.contains(AccountStatus::Created)
    }

    #[inline]
    pub fn mark_created(&mut self) {
        self.status |= AccountStatus::Created;
    }

    #[inline]
    pub fn is_selfdestructed(&self) -> bool {
        self.status.contains(AccountStatus::SelfDestructed)
    }

    #[inline]
    pub fn mark_selfdestruct(&mut self) {
        self.status |= AccountStatus::SelfDestructed;
    }

    #[inline]
    pub fn is_touched(&self) -> bool {
        self.status.contains(AccountStatus::Touched)
    }

    #[inline]
    pub fn mark_touch(&mut self) {
        self.status |= AccountStatus::Touched;
    }

    /// Whether the account counts as non-existing for call gas purposes.
    ///
    /// From Spurious Dragon onward the EIP-161 emptiness rule applies;
    /// before it, only accounts the backend never saw count.
    #[inline]
    pub fn state_clear_aware_is_empty(&self, spec: SpecId) -> bool {
        if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            self.info.is_empty()
        } else {
            self.status.contains(AccountStatus::LoadedAsNotExisting)
        }
    }

    /// Clears the per-transaction marks at transaction end.
    #[inline]
    pub fn reset_transaction_marks(&mut self) {
        self.status -= AccountStatus::Created | AccountStatus::SelfDestructed
            | AccountStatus::Touched;
    }
}

/// A cached storage slot with its transaction-start value retained for
/// net gas metering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageSlot {
    /// Value at the start of the transaction.
    pub original_value: U256,
    /// Current value.
    pub present_value: U256,
}

impl StorageSlot {
    /// Slot that has not been written this transaction.
    pub fn new(value: U256) -> Self {
        Self {
            original_value: value,
            present_value: value,
        }
    }

    /// Whether the slot differs from its transaction-start value.
    #[inline]
    pub fn is_changed(&self) -> bool {
        self.original_value != self.present_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_account() {
        let account = Account::from(AccountInfo::default());
        assert!(account.info.is_empty());
        assert!(account.state_clear_aware_is_empty(SpecId::CANCUN));
        // Pre state-clear, a default-but-seen account is not "empty".
        assert!(!account.state_clear_aware_is_empty(SpecId::HOMESTEAD));
        assert!(Account::new_not_existing().state_clear_aware_is_empty(SpecId::HOMESTEAD));
    }

    #[test]
    fn transaction_marks_reset() {
        let mut account = Account::new_not_existing();
        account.mark_created();
        account.mark_touch();
        account.mark_selfdestruct();
        account.reset_transaction_marks();
        assert!(!account.is_created());
        assert!(!account.is_touched());
        assert!(!account.is_selfdestructed());
        assert!(account.status.contains(AccountStatus::LoadedAsNotExisting));
    }
}
