use core::fmt;

/// Structural bytecode errors raised by the analyzer. A frame whose code
/// fails analysis never starts executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisError {
    /// Byte is not a defined opcode under the configured hardfork.
    OpcodeNotDefined { opcode: u8, pc: usize },
    /// PUSH immediate runs past the end of the code.
    TruncatedPush { pc: usize },
    /// JUMP/JUMPI with a statically known target that is not a valid
    /// JUMPDEST.
    InvalidJumpDestination { pc: usize, target: usize },
    /// Deployed code exceeds the EIP-170 size limit.
    CodeSizeLimit { len: usize, limit: usize },
    /// Init code exceeds the EIP-3860 size limit.
    InitcodeSizeLimit { len: usize, limit: usize },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpcodeNotDefined { opcode, pc } => {
                write!(f, "opcode {opcode:#04x} at pc {pc} is not defined")
            }
            Self::TruncatedPush { pc } => {
                write!(f, "push at pc {pc} runs past the end of the code")
            }
            Self::InvalidJumpDestination { pc, target } => {
                write!(f, "jump at pc {pc} targets invalid destination {target}")
            }
            Self::CodeSizeLimit { len, limit } => {
                write!(f, "code size {len} exceeds limit {limit}")
            }
            Self::InitcodeSizeLimit { len, limit } => {
                write!(f, "init code size {len} exceeds limit {limit}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}
