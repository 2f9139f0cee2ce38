//! # irevm-bytecode
//!
//! Bytecode validation and translation into an executable instruction
//! stream.
//!
//! Raw EVM bytecode is analyzed exactly once per `(code hash, hardfork)`
//! pair. The analyzer validates structure (defined opcodes, complete PUSH
//! immediates, statically-known jump targets, size limits), splits the code
//! into basic blocks with precomputed gas and stack requirements, and emits
//! a flat stream of word-sized slots that the interpreter drives with a
//! handler table. Common PUSH-plus-op pairs can be fused into synthetic
//! slots without changing observable semantics.

pub mod analysis;
pub mod cache;
pub mod error;
pub mod iter;
pub mod opcode;
pub mod stream;

pub use analysis::{analyze, AnalysisConfig, AnalysisKind};
pub use cache::AnalysisCache;
pub use error::AnalysisError;
pub use iter::{BytecodeIterator, RawInstruction};
pub use opcode::{synthetic, OpInfo, OPCODE_INFO};
pub use stream::{BlockInfo, InstructionStream, JumpTable};
