//! # irevm
//!
//! A deterministic, gas-metered EVM execution engine built around a
//! pre-analyzed instruction stream.
//!
//! Raw bytecode is validated and translated once per `(code hash,
//! hardfork)` into a flat stream of handler and metadata slots with
//! per-basic-block gas and stack requirements, then driven by a trampoline
//! over a handler table. State lives behind a journal with nested
//! checkpoints; linear memory is one buffer per transaction, shared down
//! the call stack through checkpoints.
//!
//! ```
//! use irevm::{CallParams, Evm};
//! use irevm::primitives::{address, Env, U256};
//! use irevm::state::{AccountInfo, EmptyBackend};
//!
//! let mut evm = Evm::new(Env::default(), EmptyBackend);
//! let caller = address!("1000000000000000000000000000000000000001");
//! evm.journal()
//!     .insert_account(caller, AccountInfo::from_balance(U256::from(1_000_000)));
//!
//! let result = evm
//!     .execute_call(CallParams {
//!         caller,
//!         target: address!("2000000000000000000000000000000000000002"),
//!         gas_limit: 100_000,
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert!(result.success);
//! ```

pub mod context;
pub mod evm;
pub mod frame;
pub mod precompile;
pub mod result;

pub use context::EvmContext;
pub use evm::Evm;
pub use frame::{CallOutcome, CreateOutcome, Frame, FrameData, FrameResult};
pub use precompile::{
    CryptoBackend, HostPrecompiles, NoCrypto, NoPrecompiles, PrecompileError, PrecompileOutput,
    PrecompileResult, PrecompileSet,
};
pub use result::{CallParams, CreateParams, EvmError, ExecutionResult};

// Re-export the component crates under their short names.
pub use bytecode;
pub use interpreter;
pub use primitives;
pub use state;
