//! The frame interpreter: a trampoline over the analyzed instruction
//! stream.
//!
//! `step` reads the handler id of the slot at the current index and invokes
//! it through the table; handlers advance the index (or jump) and `run`
//! loops until one of them sets the frame's action. The call stack stays at
//! constant depth regardless of trace length; nested EVM calls surface as
//! [`InterpreterAction::NewFrame`] to the execution loop.

use crate::{
    host::Host,
    interpreter_action::{InterpreterAction, InterpreterResult},
    memory::SharedMemory,
    table::InstructionTable,
    Gas, InstructionResult, Stack,
};
use bytecode::InstructionStream;
use primitives::{Address, Bytes, SpecId, U256};
use std::sync::Arc;

/// Inputs of the currently executing frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputsImpl {
    /// Account whose storage and balance this frame executes against.
    pub target_address: Address,
    /// Caller as seen by `CALLER`.
    pub caller_address: Address,
    /// Account the code was loaded from.
    pub bytecode_address: Address,
    /// Call data.
    pub input: Bytes,
    /// Value as seen by `CALLVALUE`.
    pub call_value: U256,
}

/// Execution state of one frame.
#[derive(Clone, Debug)]
pub struct Interpreter {
    /// The analyzed code being executed.
    pub stream: Arc<InstructionStream>,
    /// Index of the next handler slot.
    pub idx: usize,
    /// Operand stack.
    pub stack: Stack,
    /// Gas state.
    pub gas: Gas,
    /// Return data of the last finished child frame.
    pub return_data: Bytes,
    /// Frame inputs.
    pub input: InputsImpl,
    /// Whether static restrictions apply.
    pub is_static: bool,
    /// Active hardfork.
    pub spec: SpecId,
    /// Set by a handler to end the frame or spawn a child.
    pub action: Option<InterpreterAction>,
}

impl Interpreter {
    /// Creates a frame interpreter over an analyzed stream.
    pub fn new(
        stream: Arc<InstructionStream>,
        input: InputsImpl,
        is_static: bool,
        spec: SpecId,
        gas_limit: u64,
    ) -> Self {
        Self {
            stream,
            idx: 0,
            stack: Stack::new(),
            gas: Gas::new(gas_limit),
            return_data: Bytes::new(),
            input,
            is_static,
            spec,
            action: None,
        }
    }

    /// Advances past a plain handler slot.
    #[inline]
    pub fn next(&mut self) {
        self.idx += 1;
    }

    /// Advances past a handler slot and its metadata slot.
    #[inline]
    pub fn skip_metadata(&mut self) {
        self.idx += 2;
    }

    /// Metadata slot of the current instruction.
    #[inline]
    pub fn metadata(&self) -> u64 {
        self.stream.metadata(self.idx)
    }

    /// Halts the frame with the given result and no output.
    #[cold]
    #[inline(never)]
    pub fn halt(&mut self, result: InstructionResult) {
        self.action = Some(InterpreterAction::Return(InterpreterResult::new(
            result,
            Bytes::new(),
            self.gas,
        )));
    }

    /// Halts with `OutOfGas`, consuming everything left.
    #[cold]
    #[inline(never)]
    pub fn halt_oog(&mut self) {
        self.gas.spend_all();
        self.halt(InstructionResult::OutOfGas);
    }

    /// Halts with `FatalExternalError`; the host carries the detail.
    #[cold]
    #[inline(never)]
    pub fn halt_fatal(&mut self) {
        self.halt(InstructionResult::FatalExternalError);
    }

    /// Ends the frame with the given result and output.
    pub fn return_with(&mut self, result: InstructionResult, output: Bytes) {
        self.action = Some(InterpreterAction::Return(InterpreterResult::new(
            result, output, self.gas,
        )));
    }

    /// Executes the instruction at the current index. Public so stepping
    /// harnesses can freeze the machine between any two handlers.
    #[inline]
    pub fn step<H: Host + ?Sized>(
        &mut self,
        memory: &mut SharedMemory,
        table: &InstructionTable<H>,
        host: &mut H,
    ) {
        let op = self.stream.op(self.idx);
        let instruction = table[op as usize];
        instruction(InstructionContext {
            interpreter: self,
            memory,
            host,
        });
    }

    /// Runs until a handler sets the frame's action.
    pub fn run<H: Host + ?Sized>(
        &mut self,
        memory: &mut SharedMemory,
        table: &InstructionTable<H>,
        host: &mut H,
    ) -> InterpreterAction {
        while self.action.is_none() {
            self.step(memory, table, host);
        }
        self.action.take().expect("loop exits with an action set")
    }
}

/// Everything a handler can touch: the frame, the shared memory and the
/// host.
pub struct InstructionContext<'a, H: ?Sized> {
    pub interpreter: &'a mut Interpreter,
    pub memory: &'a mut SharedMemory,
    pub host: &'a mut H,
}
