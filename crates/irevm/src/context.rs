//! The transaction context: environment, journal and analysis cache, tied
//! together behind the interpreter's [`Host`] trait.
//!
//! Backend failures are deferred: the failing handler halts its frame with
//! `FatalExternalError` and the recorded [`BackendError`] is surfaced at the
//! transaction boundary.

use bytecode::AnalysisCache;
use interpreter::{AccountLoad, Host};
use primitives::{Address, Bytes, Env, Log, B256, U256};
use state::{
    BackendError, SStoreResult, SelfDestructResult, StateBackend, StateJournal, StateLoad,
};

/// Everything a transaction mutates, owned in one place: the journaled
/// state, the bytecode analysis cache and the deferred backend error.
#[derive(Debug)]
pub struct EvmContext<B: StateBackend> {
    /// Block, transaction and configuration environment.
    pub env: Env,
    /// The journaled state.
    pub journal: StateJournal<B>,
    /// Content-addressed cache of analyzed bytecode.
    pub analyses: AnalysisCache,
    /// Backend error recorded by a handler, surfaced after the frame halts.
    pub error: Option<BackendError>,
}

impl<B: StateBackend> EvmContext<B> {
    /// Creates a context over the given environment and backend.
    pub fn new(env: Env, backend: B) -> Self {
        let journal = StateJournal::new(env.cfg.spec, backend);
        let analyses = AnalysisCache::new(env.cfg.analysis_cache_size);
        Self {
            env,
            journal,
            analyses,
            error: None,
        }
    }

    /// Unwraps a journal result, deferring a backend error for the
    /// transaction boundary.
    fn defer<T>(&mut self, result: Result<T, BackendError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

impl<B: StateBackend> Host for EvmContext<B> {
    fn env(&self) -> &Env {
        &self.env
    }

    fn load_account(&mut self, address: Address) -> Option<StateLoad<AccountLoad>> {
        let spec = self.journal.spec();
        let result = self.journal.load_account(address).map(|load| {
            let is_empty = load.data.state_clear_aware_is_empty(spec);
            StateLoad::new(AccountLoad { is_empty }, load.is_cold)
        });
        self.defer(result)
    }

    fn balance(&mut self, address: Address) -> Option<StateLoad<U256>> {
        let result = self
            .journal
            .load_account(address)
            .map(|load| StateLoad::new(load.data.info.balance, load.is_cold));
        self.defer(result)
    }

    fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>> {
        let result = self.journal.load_code(address);
        self.defer(result)
    }

    fn code_hash(&mut self, address: Address) -> Option<StateLoad<B256>> {
        let spec = self.journal.spec();
        // EIP-1052: absent and empty accounts hash to zero.
        let result = self.journal.load_account(address).map(|load| {
            let hash = if load.data.state_clear_aware_is_empty(spec) {
                B256::ZERO
            } else {
                load.data.info.code_hash
            };
            StateLoad::new(hash, load.is_cold)
        });
        self.defer(result)
    }

    fn sload(&mut self, address: Address, key: U256) -> Option<StateLoad<U256>> {
        let result = self.journal.sload(address, key);
        self.defer(result)
    }

    fn sstore(
        &mut self,
        address: Address,
        key: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>> {
        let result = self.journal.sstore(address, key, value);
        self.defer(result)
    }

    fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.journal.tload(address, key)
    }

    fn tstore(&mut self, address: Address, key: U256, value: U256) {
        self.journal.tstore(address, key, value)
    }

    fn log(&mut self, log: Log) {
        self.journal.log(log)
    }

    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Option<StateLoad<SelfDestructResult>> {
        let result = self.journal.selfdestruct(address, target);
        self.defer(result)
    }

    fn block_hash(&mut self, number: u64) -> Option<B256> {
        let result = self.journal.backend().block_hash(number);
        self.defer(result)
    }
}
