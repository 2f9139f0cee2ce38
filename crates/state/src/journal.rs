//! Journaled state with nested checkpoints.
//!
//! Four caches (accounts, storage, transient storage, code) back every read
//! and absorb every write. A LIFO stack of snapshots records, copy-on-write,
//! the prior value of everything mutated inside the current checkpoint
//! scope. `checkpoint` pushes a snapshot across all caches atomically,
//! `checkpoint_revert` restores it, `checkpoint_commit` folds it into the
//! enclosing scope. The EIP-2929 warm sets, the log buffer and the
//! self-destruct queue are checkpointed the same way, so reverting a frame
//! also re-cools its accesses and drops its logs.

use crate::{
    account::{Account, AccountInfo, StorageSlot},
    backend::{BackendError, StateBackend},
    SelfDestructResult, SStoreResult, StateLoad,
};
use core::fmt;
use primitives::{
    keccak256, Address, Bytes, HashMap, HashSet, Log, SpecId, B256, U256, KECCAK_EMPTY,
};

/// `(address, slot)` key of the storage and transient caches.
pub type StorageKey = (Address, U256);

/// Handle to a journal checkpoint. Strictly LIFO: only the most recent open
/// checkpoint can be committed or reverted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JournalCheckpoint {
    index: usize,
}

/// Random-access snapshot id handed out by the external snapshot API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId(usize);

/// Error of [`StateJournal::revert_to_snapshot`]: unknown id or one already
/// reverted past.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSnapshot(pub SnapshotId);

impl fmt::Display for InvalidSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid snapshot id {}", self.0 .0)
    }
}

impl std::error::Error for InvalidSnapshot {}

/// Balance transfer failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferError {
    /// Sender balance is insufficient.
    OutOfFunds,
    /// Receiver balance would overflow.
    OverflowPayment,
    /// CREATE target address is occupied.
    CreateCollision,
}

/// Copy-on-write record of everything changed inside one checkpoint scope.
#[derive(Debug, Default)]
struct Snapshot {
    /// Prior account values; `None` marks entries absent before the scope.
    accounts: HashMap<Address, Option<Account>>,
    /// Prior storage slots.
    storage: HashMap<StorageKey, Option<StorageSlot>>,
    /// Prior transient slots.
    transient: HashMap<StorageKey, Option<U256>>,
    /// Addresses first warmed inside the scope.
    warmed_accounts: Vec<Address>,
    /// Slots first warmed inside the scope.
    warmed_slots: Vec<StorageKey>,
    logs_len: usize,
    selfdestructs_len: usize,
}

/// The journaled state shared by every frame of a transaction.
#[derive(Debug)]
pub struct StateJournal<B> {
    backend: B,
    spec: SpecId,
    accounts: HashMap<Address, Account>,
    storage: HashMap<StorageKey, StorageSlot>,
    transient: HashMap<StorageKey, U256>,
    /// Content-addressed code cache. Insert-only, so it needs no undo.
    code: HashMap<B256, Bytes>,
    warm_accounts: HashSet<Address>,
    warm_slots: HashSet<StorageKey>,
    logs: Vec<Log>,
    /// Accounts queued for deletion at transaction end.
    selfdestructs: Vec<Address>,
    snapshots: Vec<Snapshot>,
    /// Checkpoint depth recorded per external snapshot id.
    external_snapshots: Vec<usize>,
}

impl<B: StateBackend> StateJournal<B> {
    /// Creates a journal over the given backend.
    pub fn new(spec: SpecId, backend: B) -> Self {
        Self {
            backend,
            spec,
            accounts: HashMap::default(),
            storage: HashMap::default(),
            transient: HashMap::default(),
            code: HashMap::default(),
            warm_accounts: HashSet::default(),
            warm_slots: HashSet::default(),
            logs: Vec::new(),
            selfdestructs: Vec::new(),
            snapshots: Vec::new(),
            external_snapshots: Vec::new(),
        }
    }

    /// Active hardfork.
    #[inline]
    pub fn spec(&self) -> SpecId {
        self.spec
    }

    /// Sets the hardfork. Takes effect for subsequent transactions.
    #[inline]
    pub fn set_spec(&mut self, spec: SpecId) {
        self.spec = spec;
    }

    /// Backend reference.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Logs emitted so far in this transaction.
    #[inline]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Current checkpoint depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    // --- seeding (tests, genesis, host setup) ---------------------------

    /// Inserts an account directly into the committed cache.
    pub fn insert_account(&mut self, address: Address, info: AccountInfo) {
        if let Some(code) = &info.code {
            self.code.insert(info.code_hash, code.clone());
        }
        self.accounts.insert(address, Account::from(info));
    }

    /// Inserts a storage value directly into the committed cache.
    pub fn insert_storage(&mut self, address: Address, key: U256, value: U256) {
        self.storage
            .insert((address, key), StorageSlot::new(value));
    }

    /// Cached account, if loaded.
    pub fn account(&self, address: Address) -> Option<&Account> {
        self.accounts.get(&address)
    }

    /// Present value of a cached storage slot, zero when unloaded.
    pub fn storage_value(&self, address: Address, key: U256) -> U256 {
        self.storage
            .get(&(address, key))
            .map(|slot| slot.present_value)
            .unwrap_or_default()
    }

    // --- copy-on-write journaling ---------------------------------------

    fn journal_account(&mut self, address: Address) {
        if let Some(snapshot) = self.snapshots.last_mut() {
            let prior = self.accounts.get(&address).cloned();
            snapshot.accounts.entry(address).or_insert(prior);
        }
    }

    fn journal_storage(&mut self, key: StorageKey) {
        if let Some(snapshot) = self.snapshots.last_mut() {
            let prior = self.storage.get(&key).copied();
            snapshot.storage.entry(key).or_insert(prior);
        }
    }

    fn journal_transient(&mut self, key: StorageKey) {
        if let Some(snapshot) = self.snapshots.last_mut() {
            let prior = self.transient.get(&key).copied();
            snapshot.transient.entry(key).or_insert(prior);
        }
    }

    // --- checkpoints ----------------------------------------------------

    /// Opens a checkpoint scope across all caches.
    pub fn checkpoint(&mut self) -> JournalCheckpoint {
        self.snapshots.push(Snapshot {
            logs_len: self.logs.len(),
            selfdestructs_len: self.selfdestructs.len(),
            ..Default::default()
        });
        JournalCheckpoint {
            index: self.snapshots.len() - 1,
        }
    }

    /// Commits the top checkpoint: its changes persist into the enclosing
    /// scope.
    pub fn checkpoint_commit(&mut self) {
        let snapshot = self.snapshots.pop().expect("checkpoint to commit");
        if let Some(parent) = self.snapshots.last_mut() {
            for (address, prior) in snapshot.accounts {
                parent.accounts.entry(address).or_insert(prior);
            }
            for (key, prior) in snapshot.storage {
                parent.storage.entry(key).or_insert(prior);
            }
            for (key, prior) in snapshot.transient {
                parent.transient.entry(key).or_insert(prior);
            }
            parent.warmed_accounts.extend(snapshot.warmed_accounts);
            parent.warmed_slots.extend(snapshot.warmed_slots);
        }
    }

    /// Reverts the top checkpoint, restoring every recorded prior value,
    /// re-cooling accesses and truncating logs and the self-destruct queue.
    pub fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint) {
        debug_assert_eq!(checkpoint.index + 1, self.snapshots.len());
        let snapshot = self.snapshots.pop().expect("checkpoint to revert");
        for (address, prior) in snapshot.accounts {
            match prior {
                Some(account) => {
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                }
            }
        }
        for (key, prior) in snapshot.storage {
            match prior {
                Some(slot) => {
                    self.storage.insert(key, slot);
                }
                None => {
                    self.storage.remove(&key);
                }
            }
        }
        for (key, prior) in snapshot.transient {
            match prior {
                Some(value) => {
                    self.transient.insert(key, value);
                }
                None => {
                    self.transient.remove(&key);
                }
            }
        }
        for address in snapshot.warmed_accounts {
            self.warm_accounts.remove(&address);
        }
        for key in snapshot.warmed_slots {
            self.warm_slots.remove(&key);
        }
        self.logs.truncate(snapshot.logs_len);
        self.selfdestructs.truncate(snapshot.selfdestructs_len);
    }

    // --- external snapshot API ------------------------------------------

    /// Records the current checkpoint depth under a fresh id.
    pub fn snapshot(&mut self) -> SnapshotId {
        let checkpoint = self.checkpoint();
        self.external_snapshots.push(checkpoint.index);
        SnapshotId(self.external_snapshots.len() - 1)
    }

    /// Reverts to the state recorded by [`Self::snapshot`], discarding every
    /// newer snapshot id.
    pub fn revert_to_snapshot(&mut self, id: SnapshotId) -> Result<(), InvalidSnapshot> {
        let Some(&depth) = self.external_snapshots.get(id.0) else {
            return Err(InvalidSnapshot(id));
        };
        if depth >= self.snapshots.len() {
            return Err(InvalidSnapshot(id));
        }
        while self.snapshots.len() > depth {
            let checkpoint = JournalCheckpoint {
                index: self.snapshots.len() - 1,
            };
            self.checkpoint_revert(checkpoint);
        }
        self.external_snapshots.truncate(id.0);
        Ok(())
    }

    // --- accounts -------------------------------------------------------

    /// Loads an account through the read cascade, reporting its EIP-2929
    /// temperature. The load itself is not a state change; only the warm
    /// mark is journaled.
    pub fn load_account(
        &mut self,
        address: Address,
    ) -> Result<StateLoad<&mut Account>, BackendError> {
        if !self.accounts.contains_key(&address) {
            let account = match self.backend.basic(address)? {
                Some(info) => Account::from(info),
                None => Account::new_not_existing(),
            };
            self.accounts.insert(address, account);
        }
        let is_cold = self.warm_accounts.insert(address);
        if is_cold {
            if let Some(snapshot) = self.snapshots.last_mut() {
                snapshot.warmed_accounts.push(address);
            }
        }
        Ok(StateLoad::new(
            self.accounts.get_mut(&address).expect("just inserted"),
            is_cold,
        ))
    }

    /// Loads an account and attaches its code.
    pub fn load_code(&mut self, address: Address) -> Result<StateLoad<Bytes>, BackendError> {
        let load = self.load_account(address)?;
        let is_cold = load.is_cold;
        let code_hash = load.data.info.code_hash;
        if let Some(code) = &load.data.info.code {
            return Ok(StateLoad::new(code.clone(), is_cold));
        }
        let code = if code_hash == KECCAK_EMPTY {
            Bytes::new()
        } else if let Some(code) = self.code.get(&code_hash) {
            code.clone()
        } else {
            let code = self.backend.code_by_hash(code_hash)?;
            self.code.insert(code_hash, code.clone());
            code
        };
        self.accounts
            .get_mut(&address)
            .expect("account is loaded")
            .info
            .code = Some(code.clone());
        Ok(StateLoad::new(code, is_cold))
    }

    /// Marks an account touched. Touched empty accounts matter to EIP-161
    /// state clearing, which the backend applies on persist.
    pub fn touch(&mut self, address: Address) {
        if self.accounts.contains_key(&address) {
            self.journal_account(address);
            self.accounts
                .get_mut(&address)
                .expect("checked above")
                .mark_touch();
        }
    }

    /// Increments an account's nonce, returning the new value, or `None` on
    /// overflow.
    pub fn inc_nonce(&mut self, address: Address) -> Option<u64> {
        let nonce = self.accounts.get(&address)?.info.nonce;
        if nonce == u64::MAX {
            return None;
        }
        self.journal_account(address);
        let account = self.accounts.get_mut(&address).expect("checked above");
        account.mark_touch();
        account.info.nonce = nonce + 1;
        Some(nonce + 1)
    }

    /// Installs code on an account, hashing it and feeding the code cache.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let hash = keccak256(&code);
        self.journal_account(address);
        let account = self
            .accounts
            .get_mut(&address)
            .expect("account to set code on is loaded");
        account.mark_touch();
        account.info.code_hash = hash;
        account.info.code = Some(code.clone());
        self.code.insert(hash, code);
    }

    /// Moves `value` from one account to another. Both are loaded and
    /// touched; a zero-value transfer still touches the receiver.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<Option<TransferError>, BackendError> {
        self.load_account(to)?;
        if value.is_zero() {
            self.touch(to);
            return Ok(None);
        }
        self.load_account(from)?;

        let from_balance = self.accounts.get(&from).expect("loaded").info.balance;
        let Some(new_from_balance) = from_balance.checked_sub(value) else {
            return Ok(Some(TransferError::OutOfFunds));
        };

        // Debit before reading the receiver so a self-transfer nets zero.
        self.journal_account(from);
        let from_account = self.accounts.get_mut(&from).expect("loaded");
        from_account.mark_touch();
        from_account.info.balance = new_from_balance;

        let to_balance = self.accounts.get(&to).expect("loaded").info.balance;
        let Some(new_to_balance) = to_balance.checked_add(value) else {
            // Partial mutation is fine: the surrounding checkpoint reverts.
            return Ok(Some(TransferError::OverflowPayment));
        };
        self.journal_account(to);
        let to_account = self.accounts.get_mut(&to).expect("loaded");
        to_account.mark_touch();
        to_account.info.balance = new_to_balance;
        Ok(None)
    }

    /// Creates an account under a fresh checkpoint: collision check, created
    /// mark, EIP-161 nonce, value transfer from the caller. On error the
    /// checkpoint is already reverted.
    ///
    /// Both `caller` and `target` must be loaded.
    pub fn create_account_checkpoint(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        spec: SpecId,
    ) -> Result<JournalCheckpoint, TransferError> {
        let checkpoint = self.checkpoint();

        let caller_balance = self
            .accounts
            .get(&caller)
            .expect("caller is loaded")
            .info
            .balance;
        if caller_balance < value {
            self.checkpoint_revert(checkpoint);
            return Err(TransferError::OutOfFunds);
        }

        let target_account = self.accounts.get(&target).expect("target is loaded");
        if target_account.info.code_hash != KECCAK_EMPTY || target_account.info.nonce != 0 {
            self.checkpoint_revert(checkpoint);
            return Err(TransferError::CreateCollision);
        }

        self.journal_account(target);
        self.journal_account(caller);

        let target_account = self.accounts.get_mut(&target).expect("target is loaded");
        target_account.mark_created();
        target_account.mark_touch();
        target_account.info.code = None;
        if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            target_account.info.nonce = 1;
        }
        let Some(new_balance) = target_account.info.balance.checked_add(value) else {
            self.checkpoint_revert(checkpoint);
            return Err(TransferError::OverflowPayment);
        };
        target_account.info.balance = new_balance;

        // Balance check above makes this subtraction safe.
        let caller_account = self.accounts.get_mut(&caller).expect("caller is loaded");
        caller_account.info.balance -= value;

        Ok(checkpoint)
    }

    /// Queues a self-destruct: balance moves to the beneficiary now, the
    /// deletion applies at transaction end. Post-Cancun only accounts
    /// created in the same transaction are deleted (EIP-6780).
    pub fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Result<StateLoad<SelfDestructResult>, BackendError> {
        let spec = self.spec;
        let target_load = self.load_account(target)?;
        let is_cold = target_load.is_cold;
        let target_exists = !target_load.data.state_clear_aware_is_empty(spec);

        if address != target {
            let balance = self.accounts.get(&address).expect("executing").info.balance;
            self.journal_account(target);
            let target_account = self.accounts.get_mut(&target).expect("just loaded");
            target_account.mark_touch();
            target_account.info.balance = target_account.info.balance.saturating_add(balance);
        }

        self.journal_account(address);
        let account = self.accounts.get_mut(&address).expect("executing account");
        let balance = account.info.balance;
        let previously_destroyed = account.is_selfdestructed();
        let is_cancun = spec.is_enabled_in(SpecId::CANCUN);

        if account.is_created() || !is_cancun {
            account.mark_selfdestruct();
            account.mark_touch();
            account.info.balance = U256::ZERO;
            if !previously_destroyed {
                self.selfdestructs.push(address);
            }
        } else if address != target {
            account.mark_touch();
            account.info.balance = U256::ZERO;
        }

        Ok(StateLoad::new(
            SelfDestructResult {
                had_value: !balance.is_zero(),
                target_exists,
                previously_destroyed,
            },
            is_cold,
        ))
    }

    // --- storage --------------------------------------------------------

    /// Reads a storage slot through the read cascade. Accounts created in
    /// this transaction skip the backend: their storage is known empty.
    pub fn sload(&mut self, address: Address, key: U256) -> Result<StateLoad<U256>, BackendError> {
        let storage_key = (address, key);
        if !self.storage.contains_key(&storage_key) {
            let is_newly_created = self
                .accounts
                .get(&address)
                .map(Account::is_created)
                .unwrap_or(false);
            let value = if is_newly_created {
                U256::ZERO
            } else {
                self.backend.storage(address, key)?
            };
            self.storage.insert(storage_key, StorageSlot::new(value));
        }
        let is_cold = self.warm_slots.insert(storage_key);
        if is_cold {
            if let Some(snapshot) = self.snapshots.last_mut() {
                snapshot.warmed_slots.push(storage_key);
            }
        }
        let value = self.storage[&storage_key].present_value;
        Ok(StateLoad::new(value, is_cold))
    }

    /// Writes a storage slot, returning the original/present/new triple for
    /// net gas metering.
    pub fn sstore(
        &mut self,
        address: Address,
        key: U256,
        new: U256,
    ) -> Result<StateLoad<SStoreResult>, BackendError> {
        let load = self.sload(address, key)?;
        let storage_key = (address, key);
        let slot = self.storage[&storage_key];
        if slot.present_value != new {
            self.journal_storage(storage_key);
            self.storage
                .get_mut(&storage_key)
                .expect("slot was loaded")
                .present_value = new;
        }
        Ok(StateLoad::new(
            SStoreResult {
                original_value: slot.original_value,
                present_value: slot.present_value,
                new_value: new,
            },
            load.is_cold,
        ))
    }

    // --- transient storage (EIP-1153) -----------------------------------

    /// Reads a transient slot; zero at the start of every transaction.
    pub fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.transient
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    /// Writes a transient slot, journaled like persistent storage but never
    /// persisted.
    pub fn tstore(&mut self, address: Address, key: U256, value: U256) {
        let key = (address, key);
        let current = self.transient.get(&key).copied().unwrap_or_default();
        if current == value {
            return;
        }
        self.journal_transient(key);
        if value.is_zero() {
            self.transient.remove(&key);
        } else {
            self.transient.insert(key, value);
        }
    }

    // --- logs -----------------------------------------------------------

    /// Appends a log record; dropped if the surrounding scope reverts.
    pub fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    // --- transaction lifecycle ------------------------------------------

    /// Applies queued deletions, returns the transaction's logs, and resets
    /// all per-transaction state: transient storage, warm sets, account
    /// marks, original storage values.
    ///
    /// Every frame checkpoint must be settled; checkpoints opened by the
    /// snapshot API may stay open across transactions.
    pub fn finalize(&mut self) -> Vec<Log> {
        debug_assert_eq!(
            self.snapshots.len(),
            self.external_snapshots.len(),
            "open frame checkpoint at finalize"
        );

        let destroyed: HashSet<Address> = self.selfdestructs.drain(..).collect();
        if !destroyed.is_empty() {
            for address in &destroyed {
                self.accounts.remove(address);
            }
            self.storage.retain(|(address, _), _| !destroyed.contains(address));
        }

        self.transient.clear();
        self.warm_accounts.clear();
        self.warm_slots.clear();
        for account in self.accounts.values_mut() {
            account.reset_transaction_marks();
        }
        for slot in self.storage.values_mut() {
            slot.original_value = slot.present_value;
        }
        core::mem::take(&mut self.logs)
    }

    /// Abandons a transaction mid-flight (backend pending/failure): reverts
    /// every open checkpoint and resets per-transaction state without
    /// applying deletions or keeping logs.
    pub fn abort(&mut self) {
        while !self.snapshots.is_empty() {
            let checkpoint = JournalCheckpoint {
                index: self.snapshots.len() - 1,
            };
            self.checkpoint_revert(checkpoint);
        }
        self.external_snapshots.clear();
        self.selfdestructs.clear();
        self.logs.clear();
        let _ = self.finalize();
    }
}
