//! Actions a frame yields to the execution loop: spawn a child frame or
//! return a result.

use crate::{Gas, InstructionResult};
use core::ops::Range;
use primitives::{Address, Bytes, B256, U256};

/// How a call passes value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallValue {
    /// Value is transferred from caller to callee (`CALL`, `CALLCODE`).
    Transfer(U256),
    /// Value is only apparent to the callee (`DELEGATECALL`).
    Apparent(U256),
}

impl Default for CallValue {
    fn default() -> Self {
        Self::Transfer(U256::ZERO)
    }
}

impl CallValue {
    /// The value as seen by `CALLVALUE` in the callee.
    #[inline]
    pub const fn get(&self) -> U256 {
        match *self {
            Self::Transfer(value) | Self::Apparent(value) => value,
        }
    }

    /// Whether this call moves balance.
    #[inline]
    pub fn transfers(&self) -> bool {
        matches!(self, Self::Transfer(value) if !value.is_zero())
    }
}

/// Which call instruction spawned the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallScheme {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// Inputs of a message call frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallInputs {
    /// Call data.
    pub input: Bytes,
    /// Gas forwarded to the callee, stipend included.
    pub gas_limit: u64,
    /// Account whose storage and balance the frame executes against.
    pub target_address: Address,
    /// Account whose code runs. Differs from `target_address` for
    /// `CALLCODE`/`DELEGATECALL`.
    pub bytecode_address: Address,
    /// Caller as seen by the callee.
    pub caller: Address,
    /// Transferred or apparent value.
    pub value: CallValue,
    /// The spawning instruction.
    pub scheme: CallScheme,
    /// Whether the frame runs under static restrictions.
    pub is_static: bool,
    /// Caller-memory range the return data is copied into.
    pub return_memory_offset: Range<usize>,
}

/// Address derivation scheme of a create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreateScheme {
    /// `CREATE`: keccak256(rlp([sender, nonce])).
    Create,
    /// `CREATE2`: keccak256(0xff ++ sender ++ salt ++ keccak256(init_code)).
    Create2 { salt: B256 },
}

/// Inputs of a contract creation frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateInputs {
    /// The creating account.
    pub caller: Address,
    /// Address derivation scheme.
    pub scheme: CreateScheme,
    /// Endowment of the new account.
    pub value: U256,
    /// Init code to run.
    pub init_code: Bytes,
    /// Gas forwarded to the init frame.
    pub gas_limit: u64,
}

/// Input of a frame about to be created.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameInput {
    Call(Box<CallInputs>),
    Create(Box<CreateInputs>),
}

/// Result of a finished frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpreterResult {
    /// Why the frame stopped.
    pub result: InstructionResult,
    /// Return or revert payload.
    pub output: Bytes,
    /// Gas state at the stop.
    pub gas: Gas,
}

impl InterpreterResult {
    /// Returns a new result.
    pub const fn new(result: InstructionResult, output: Bytes, gas: Gas) -> Self {
        Self {
            result,
            output,
            gas,
        }
    }

    /// Whether the frame succeeded.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the frame reverted preserving gas.
    #[inline]
    pub const fn is_revert(&self) -> bool {
        self.result.is_revert()
    }

    /// Whether the frame faulted consuming gas.
    #[inline]
    pub const fn is_error(&self) -> bool {
        self.result.is_error()
    }
}

/// What the interpreter wants the execution loop to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpreterAction {
    /// Spawn a child frame.
    NewFrame(FrameInput),
    /// The frame finished.
    Return(InterpreterResult),
}
