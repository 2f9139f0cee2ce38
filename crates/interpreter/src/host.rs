//! Interface the interpreter uses to reach state, environment and logs.
//!
//! The facade's transaction context implements this over the state journal.
//! Methods returning `Option` signal a backend failure with `None`; the
//! handler halts the frame with `FatalExternalError` and the host surfaces
//! the recorded error at the transaction boundary.

use primitives::{Address, Bytes, Env, Log, B256, U256};
use state::{SStoreResult, SelfDestructResult, StateLoad};

/// Facts about an account needed to price a call to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountLoad {
    /// Whether the account counts as non-existing for new-account gas
    /// accounting (state-clear aware).
    pub is_empty: bool,
}

/// Host environment the instruction handlers run against.
pub trait Host {
    /// Block, transaction and configuration environment.
    fn env(&self) -> &Env;

    /// Loads an account, reporting its temperature and emptiness.
    fn load_account(&mut self, address: Address) -> Option<StateLoad<AccountLoad>>;

    /// Account balance.
    fn balance(&mut self, address: Address) -> Option<StateLoad<U256>>;

    /// Account code.
    fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>>;

    /// Account code hash per EIP-1052: zero for absent or empty accounts.
    fn code_hash(&mut self, address: Address) -> Option<StateLoad<B256>>;

    /// Storage read.
    fn sload(&mut self, address: Address, key: U256) -> Option<StateLoad<U256>>;

    /// Storage write, returning the net-metering triple.
    fn sstore(&mut self, address: Address, key: U256, value: U256)
        -> Option<StateLoad<SStoreResult>>;

    /// Transient storage read (EIP-1153).
    fn tload(&mut self, address: Address, key: U256) -> U256;

    /// Transient storage write (EIP-1153).
    fn tstore(&mut self, address: Address, key: U256, value: U256);

    /// Emits a log record.
    fn log(&mut self, log: Log);

    /// Queues a self-destruct of `address` in favor of `target`.
    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Option<StateLoad<SelfDestructResult>>;

    /// Hash of block `number`.
    fn block_hash(&mut self, number: u64) -> Option<B256>;
}

/// Host with no state behind it; used by handler unit tests.
#[derive(Debug, Default)]
pub struct DummyHost {
    pub env: Env,
    pub logs: Vec<Log>,
}

impl Host for DummyHost {
    fn env(&self) -> &Env {
        &self.env
    }

    fn load_account(&mut self, _address: Address) -> Option<StateLoad<AccountLoad>> {
        Some(StateLoad::new(AccountLoad { is_empty: true }, false))
    }

    fn balance(&mut self, _address: Address) -> Option<StateLoad<U256>> {
        Some(StateLoad::new(U256::ZERO, false))
    }

    fn code(&mut self, _address: Address) -> Option<StateLoad<Bytes>> {
        Some(StateLoad::new(Bytes::new(), false))
    }

    fn code_hash(&mut self, _address: Address) -> Option<StateLoad<B256>> {
        Some(StateLoad::new(B256::ZERO, false))
    }

    fn sload(&mut self, _address: Address, _key: U256) -> Option<StateLoad<U256>> {
        Some(StateLoad::new(U256::ZERO, false))
    }

    fn sstore(
        &mut self,
        _address: Address,
        _key: U256,
        value: U256,
    ) -> Option<StateLoad<SStoreResult>> {
        Some(StateLoad::new(
            SStoreResult {
                original_value: U256::ZERO,
                present_value: U256::ZERO,
                new_value: value,
            },
            false,
        ))
    }

    fn tload(&mut self, _address: Address, _key: U256) -> U256 {
        U256::ZERO
    }

    fn tstore(&mut self, _address: Address, _key: U256, _value: U256) {}

    fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn selfdestruct(
        &mut self,
        _address: Address,
        _target: Address,
    ) -> Option<StateLoad<SelfDestructResult>> {
        Some(StateLoad::new(SelfDestructResult::default(), false))
    }

    fn block_hash(&mut self, _number: u64) -> Option<B256> {
        Some(B256::ZERO)
    }
}
