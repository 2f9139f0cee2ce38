//! # irevm-interpreter
//!
//! Executes analyzed instruction streams: gas accounting, the operand
//! stack, the shared memory store, the [`Host`] interface and the handler
//! table.
//!
//! Static gas and stack bounds are validated once per basic block; handlers
//! run with unchecked stack primitives and charge only their dynamic costs.
//! Nested calls never recurse into the interpreter: they surface as
//! [`InterpreterAction::NewFrame`] for the execution loop to drive.

#[macro_use]
mod macros;

mod instruction_result;

pub mod gas;
pub mod host;
pub mod instructions;
pub mod interpreter;
pub mod interpreter_action;
pub mod memory;
pub mod stack;
pub mod table;

pub use gas::Gas;
pub use host::{AccountLoad, DummyHost, Host};
pub use instruction_result::InstructionResult;
pub use interpreter::{InputsImpl, InstructionContext, Interpreter};
pub use interpreter_action::{
    CallInputs, CallScheme, CallValue, CreateInputs, CreateScheme, FrameInput, InterpreterAction,
    InterpreterResult,
};
pub use memory::{next_multiple_of_32, resize_memory, SharedMemory};
pub use stack::Stack;
pub use table::{instruction_table, Instruction, InstructionTable};
