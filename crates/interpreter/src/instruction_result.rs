/// Result of a frame's instruction execution.
///
/// The discriminants group the variants into success, revert and error
/// ranges, matched by the [`return_ok!`], [`return_revert!`] and
/// [`return_error!`] macros.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstructionResult {
    /// Encountered a `STOP` opcode.
    #[default]
    Stop,
    /// Clean return from the current frame.
    Return,
    /// Frame ended in `SELFDESTRUCT`.
    SelfDestruct,

    // Revert codes: the frame failed but remaining gas is preserved.
    /// Explicit `REVERT`.
    Revert = 0x10,
    /// Exceeded the maximum call depth.
    CallTooDeep,
    /// Insufficient balance for a transfer.
    OutOfFunds,
    /// `CREATE`/`CREATE2` at an occupied address.
    CreateCollision,
    /// Deployed code exceeds the EIP-170 limit.
    CreateContractSizeLimit,

    // Error codes: the frame failed consuming all of its gas.
    /// Out of gas at a block entry or a dynamic charge.
    OutOfGas = 0x50,
    /// Out of gas while expanding memory.
    MemoryOOG,
    /// The configured memory limit was exceeded.
    MemoryLimitOOG,
    /// Out of gas inside a precompile.
    PrecompileOOG,
    /// An operand does not fit the machine's address range.
    InvalidOperandOOG,
    /// Unknown or fork-disabled opcode reached at runtime.
    OpcodeNotFound,
    /// `CALL` with value transfer inside a static context.
    CallNotAllowedInsideStatic,
    /// State mutation inside a static context.
    StateChangeDuringStaticCall,
    /// The designated `INVALID` (0xFE) opcode.
    InvalidFEOpcode,
    /// Dynamic jump to a position that is not a `JUMPDEST`.
    InvalidJump,
    /// Opcode not activated under the configured hardfork.
    NotActivated,
    /// Stack underflow detected at block entry.
    StackUnderflow,
    /// Stack overflow detected at block entry.
    StackOverflow,
    /// Memory or return-data offset out of range.
    OutOfOffset,
    /// Balance addition overflowed.
    OverflowPayment,
    /// Precompile execution failed.
    PrecompileError,
    /// Caller nonce cannot be incremented.
    NonceOverflow,
    /// Deployed code starts with the 0xEF byte (EIP-3541).
    CreateContractStartingWithEF,
    /// Init code exceeds the EIP-3860 limit.
    CreateInitCodeSizeLimit,
    /// The state backend failed; transaction-fatal.
    FatalExternalError,
}

/// Matches every successful [`InstructionResult`].
#[macro_export]
macro_rules! return_ok {
    () => {
        $crate::InstructionResult::Stop
            | $crate::InstructionResult::Return
            | $crate::InstructionResult::SelfDestruct
    };
}

/// Matches every gas-preserving failure.
#[macro_export]
macro_rules! return_revert {
    () => {
        $crate::InstructionResult::Revert
            | $crate::InstructionResult::CallTooDeep
            | $crate::InstructionResult::OutOfFunds
            | $crate::InstructionResult::CreateCollision
            | $crate::InstructionResult::CreateContractSizeLimit
    };
}

/// Matches every gas-consuming fault.
#[macro_export]
macro_rules! return_error {
    () => {
        $crate::InstructionResult::OutOfGas
            | $crate::InstructionResult::MemoryOOG
            | $crate::InstructionResult::MemoryLimitOOG
            | $crate::InstructionResult::PrecompileOOG
            | $crate::InstructionResult::InvalidOperandOOG
            | $crate::InstructionResult::OpcodeNotFound
            | $crate::InstructionResult::CallNotAllowedInsideStatic
            | $crate::InstructionResult::StateChangeDuringStaticCall
            | $crate::InstructionResult::InvalidFEOpcode
            | $crate::InstructionResult::InvalidJump
            | $crate::InstructionResult::NotActivated
            | $crate::InstructionResult::StackUnderflow
            | $crate::InstructionResult::StackOverflow
            | $crate::InstructionResult::OutOfOffset
            | $crate::InstructionResult::OverflowPayment
            | $crate::InstructionResult::PrecompileError
            | $crate::InstructionResult::NonceOverflow
            | $crate::InstructionResult::CreateContractStartingWithEF
            | $crate::InstructionResult::CreateInitCodeSizeLimit
            | $crate::InstructionResult::FatalExternalError
    };
}

impl InstructionResult {
    /// Returns whether the result is a success.
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, return_ok!())
    }

    /// Returns whether the result is a success or a revert.
    #[inline]
    pub const fn is_ok_or_revert(self) -> bool {
        matches!(self, return_ok!() | return_revert!())
    }

    /// Returns whether the result is a gas-preserving failure.
    #[inline]
    pub const fn is_revert(self) -> bool {
        matches!(self, return_revert!())
    }

    /// Returns whether the result is a gas-consuming fault.
    #[inline]
    pub const fn is_error(self) -> bool {
        matches!(self, return_error!())
    }
}

#[cfg(test)]
mod tests {
    use super::InstructionResult;

    #[test]
    fn all_results_are_covered() {
        match InstructionResult::Stop {
            return_error!() => {}
            return_revert!() => {}
            return_ok!() => {}
        }
    }

    #[test]
    fn partitions_are_disjoint() {
        let ok = [
            InstructionResult::Stop,
            InstructionResult::Return,
            InstructionResult::SelfDestruct,
        ];
        for result in ok {
            assert!(result.is_ok());
            assert!(!result.is_revert());
            assert!(!result.is_error());
        }

        // Collision and size-limit failures preserve remaining gas like a
        // revert, with an empty payload.
        let reverts = [
            InstructionResult::Revert,
            InstructionResult::CallTooDeep,
            InstructionResult::OutOfFunds,
            InstructionResult::CreateCollision,
            InstructionResult::CreateContractSizeLimit,
        ];
        for result in reverts {
            assert!(result.is_revert());
            assert!(result.is_ok_or_revert());
            assert!(!result.is_error());
        }

        let errors = [
            InstructionResult::OutOfGas,
            InstructionResult::InvalidJump,
            InstructionResult::StackUnderflow,
            InstructionResult::StackOverflow,
            InstructionResult::StateChangeDuringStaticCall,
            InstructionResult::CreateInitCodeSizeLimit,
            InstructionResult::FatalExternalError,
        ];
        for result in errors {
            assert!(result.is_error());
            assert!(!result.is_ok_or_revert());
        }
    }
}
