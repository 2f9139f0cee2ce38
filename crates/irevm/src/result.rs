//! Top-level parameters and results.

use core::fmt;
use interpreter::InstructionResult;
use primitives::{Address, Bytes, Log, B256, U256};
use state::BackendError;

/// Parameters of a top-level message call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallParams {
    /// The calling account; also becomes the transaction origin.
    pub caller: Address,
    /// The called account.
    pub target: Address,
    /// Value transferred from caller to target.
    pub value: U256,
    /// Call data.
    pub input: Bytes,
    /// Gas available to the frame. No intrinsic transaction gas is charged.
    pub gas_limit: u64,
    /// Run the frame under static restrictions.
    pub static_call: bool,
}

/// Parameters of a top-level contract creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateParams {
    /// The creating account.
    pub caller: Address,
    /// Endowment of the new account.
    pub value: U256,
    /// Init code to execute.
    pub init_code: Bytes,
    /// Gas available to the init frame.
    pub gas_limit: u64,
    /// `Some` selects CREATE2 with this salt; `None` selects CREATE.
    pub salt: Option<B256>,
}

/// Result of a top-level execution, populated consistently whether the
/// transaction succeeded, reverted or faulted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionResult {
    /// Whether the transaction succeeded.
    pub success: bool,
    /// Taxonomy of how the top frame ended.
    pub reason: InstructionResult,
    /// Gas consumed, net of the capped refund.
    pub gas_used: u64,
    /// Refund granted, already capped per EIP-3529.
    pub gas_refunded: u64,
    /// Return data (deployed code for creations).
    pub output: Bytes,
    /// Logs emitted by the transaction. Empty unless it succeeded.
    pub logs: Vec<Log>,
    /// Address of the created contract, for successful creations.
    pub created_address: Option<Address>,
    /// Revert payload, when the transaction reverted.
    pub revert_reason: Option<Bytes>,
}

/// Transaction-fatal failures. Everything else is reported through
/// [`ExecutionResult`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvmError {
    /// A fork-backend fetch is in flight; resolve request `id` and
    /// re-execute.
    Pending(u64),
    /// The backend failed hard.
    Backend(String),
}

impl fmt::Display for EvmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(id) => write!(f, "backend request {id} pending"),
            Self::Backend(msg) => write!(f, "backend failure: {msg}"),
        }
    }
}

impl std::error::Error for EvmError {}

impl From<BackendError> for EvmError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Pending(id) => Self::Pending(id),
            BackendError::Failed(msg) => Self::Backend(msg),
        }
    }
}
