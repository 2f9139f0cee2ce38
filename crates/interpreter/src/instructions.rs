//! Instruction handlers, grouped the way the opcode space is.

pub mod arithmetic;
pub mod bitwise;
pub mod block_info;
pub mod contract;
pub mod control;
pub mod fused;
pub mod host;
pub mod i256;
pub mod memory;
pub mod stack;
pub mod system;
pub mod tx_info;

/// Shared scaffolding for handler tests: analyze a snippet and run it to
/// completion against a [`DummyHost`](crate::host::DummyHost).
#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        host::DummyHost,
        interpreter::{InputsImpl, Interpreter},
        interpreter_action::{InterpreterAction, InterpreterResult},
        memory::SharedMemory,
        table::instruction_table,
        InstructionResult,
    };
    use bytecode::{analyze, AnalysisConfig};
    use primitives::{Bytes, SpecId};
    use std::sync::Arc;

    pub(crate) fn exec(
        code: &[u8],
        input: Bytes,
        gas_limit: u64,
        fusion: bool,
    ) -> (Interpreter, InterpreterResult) {
        let mut config = AnalysisConfig::new(SpecId::CANCUN);
        config.enable_fusion = fusion;
        let stream = Arc::new(analyze(Bytes::copy_from_slice(code), &config).unwrap());
        let mut interp = Interpreter::new(
            stream,
            InputsImpl {
                input,
                ..Default::default()
            },
            false,
            SpecId::CANCUN,
            gas_limit,
        );
        let mut memory = SharedMemory::new();
        let table = instruction_table::<DummyHost>();
        let mut host = DummyHost::default();
        let action = interp.run(&mut memory, &table, &mut host);
        let InterpreterAction::Return(result) = action else {
            panic!("expected the snippet to return, got {action:?}");
        };
        (interp, result)
    }

    /// Runs a snippet that must stop cleanly; returns the final machine.
    pub(crate) fn run_block(code: &[u8]) -> Interpreter {
        let (interp, result) = exec(code, Bytes::new(), 1_000_000, true);
        assert_eq!(result.result, InstructionResult::Stop, "snippet faulted");
        interp
    }

    /// Same as [`run_block`] with fusion disabled.
    pub(crate) fn run_block_plain(code: &[u8]) -> Interpreter {
        let (interp, result) = exec(code, Bytes::new(), 1_000_000, false);
        assert_eq!(result.result, InstructionResult::Stop, "snippet faulted");
        interp
    }

    /// Runs a snippet and returns its result, fault or not.
    pub(crate) fn run_block_result(code: &[u8]) -> InterpreterResult {
        exec(code, Bytes::new(), 1_000_000, true).1
    }

    /// Runs a snippet under a specific gas limit.
    pub(crate) fn run_with_gas(code: &[u8], gas_limit: u64) -> InterpreterResult {
        exec(code, Bytes::new(), gas_limit, true).1
    }

    /// Runs a snippet under a specific gas limit, asserting clean stop.
    pub(crate) fn run_with_gas_ok(code: &[u8], gas_limit: u64) -> Interpreter {
        let (interp, result) = exec(code, Bytes::new(), gas_limit, true);
        assert_eq!(result.result, InstructionResult::Stop, "snippet faulted");
        interp
    }

    /// Runs a snippet with call data.
    pub(crate) fn run_block_with_input(code: &[u8], input: Bytes) -> Interpreter {
        let (interp, result) = exec(code, input, 1_000_000, true);
        assert_eq!(result.result, InstructionResult::Stop, "snippet faulted");
        interp
    }
}
