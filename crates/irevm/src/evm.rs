//! The execution engine: transaction lifecycle and the frame loop.

use crate::{
    context::EvmContext,
    frame::{self, Frame, FrameResult, ItemOrResult},
    precompile::{HostPrecompiles, NoCrypto, PrecompileSet},
    result::{CallParams, CreateParams, EvmError, ExecutionResult},
};
use interpreter::{
    instruction_table, CallInputs, CallScheme, CallValue, CreateInputs, CreateScheme, FrameInput,
    InstructionResult, InterpreterAction, SharedMemory,
};
use primitives::{Address, Bytes, Env, SpecId};
use state::{SnapshotId, StateBackend, StateJournal};
use tracing::{debug, trace};

/// The EVM: environment, journaled state, analysis cache and precompiles,
/// with [`execute_call`](Evm::execute_call) and
/// [`execute_create`](Evm::execute_create) as entry points.
#[derive(Debug)]
pub struct Evm<B: StateBackend, P: PrecompileSet = HostPrecompiles<NoCrypto>> {
    /// The transaction context, shared by every frame.
    pub ctx: EvmContext<B>,
    /// Precompiled contracts.
    pub precompiles: P,
}

impl<B: StateBackend> Evm<B> {
    /// Creates an engine with the standard precompile addresses mapped but
    /// no cryptography wired in.
    pub fn new(env: Env, backend: B) -> Self {
        Self::with_precompiles(env, backend, HostPrecompiles::new(NoCrypto))
    }
}

impl<B: StateBackend, P: PrecompileSet> Evm<B, P> {
    /// Creates an engine with a custom precompile set.
    pub fn with_precompiles(env: Env, backend: B, precompiles: P) -> Self {
        Self {
            ctx: EvmContext::new(env, backend),
            precompiles,
        }
    }

    /// The journaled state, for seeding and inspection.
    pub fn journal(&mut self) -> &mut StateJournal<B> {
        &mut self.ctx.journal
    }

    /// Records a state snapshot for test and debugging harnesses.
    pub fn snapshot(&mut self) -> SnapshotId {
        self.ctx.journal.snapshot()
    }

    /// Reverts to a recorded snapshot.
    pub fn revert_to_snapshot(&mut self, id: SnapshotId) -> Result<(), state::InvalidSnapshot> {
        self.ctx.journal.revert_to_snapshot(id)
    }

    /// Executes a message call as a transaction.
    pub fn execute_call(&mut self, params: CallParams) -> Result<ExecutionResult, EvmError> {
        let gas_limit = params.gas_limit;
        self.begin_transaction(params.caller, &[params.target])?;
        let inputs = CallInputs {
            input: params.input,
            gas_limit,
            target_address: params.target,
            bytecode_address: params.target,
            caller: params.caller,
            value: CallValue::Transfer(params.value),
            scheme: CallScheme::Call,
            is_static: params.static_call,
            return_memory_offset: usize::MAX..usize::MAX,
        };
        let outcome = self.run_frames(FrameInput::Call(Box::new(inputs)));
        self.finish_transaction(gas_limit, outcome)
    }

    /// Executes a contract creation as a transaction.
    pub fn execute_create(&mut self, params: CreateParams) -> Result<ExecutionResult, EvmError> {
        let gas_limit = params.gas_limit;
        self.begin_transaction(params.caller, &[])?;
        let inputs = CreateInputs {
            caller: params.caller,
            scheme: match params.salt {
                Some(salt) => CreateScheme::Create2 { salt },
                None => CreateScheme::Create,
            },
            value: params.value,
            init_code: params.init_code,
            gas_limit,
        };
        let outcome = self.run_frames(FrameInput::Create(Box::new(inputs)));
        self.finish_transaction(gas_limit, outcome)
    }

    /// Resets per-transaction state and warms the standing warm set: origin,
    /// targets, precompiles, and the coinbase from Shanghai (EIP-3651).
    fn begin_transaction(&mut self, origin: Address, targets: &[Address]) -> Result<(), EvmError> {
        let spec = self.ctx.env.cfg.spec;
        self.ctx.journal.set_spec(spec);
        self.ctx.env.tx.caller = origin;
        self.ctx.error = None;
        debug!(%origin, ?spec, "transaction start");

        let mut warm = vec![origin];
        warm.extend_from_slice(targets);
        if spec.is_enabled_in(SpecId::SHANGHAI) {
            warm.push(self.ctx.env.block.coinbase);
        }
        warm.extend(self.precompiles.warm_addresses(spec));
        for address in warm {
            if let Err(error) = self.ctx.journal.load_account(address) {
                self.ctx.journal.abort();
                return Err(error.into());
            }
        }
        Ok(())
    }

    /// Drives the frame stack until the top-level frame finishes.
    fn run_frames(&mut self, first: FrameInput) -> Result<FrameResult, EvmError> {
        let table = instruction_table::<EvmContext<B>>();
        let mut memory = SharedMemory::with_memory_limit(self.ctx.env.cfg.memory_limit);
        let mut frames: Vec<Frame> = Vec::new();

        match frame::init_frame(&mut self.ctx, &self.precompiles, 0, first)? {
            ItemOrResult::Item(frame) => frames.push(frame),
            ItemOrResult::Result(result) => return Ok(result),
        }

        loop {
            let (action, parent_depth) = {
                let frame = frames.last_mut().expect("loop runs with a frame");
                let action = frame.interpreter.run(&mut memory, &table, &mut self.ctx);
                (action, frame.depth)
            };
            if let Some(error) = self.ctx.error.take() {
                return Err(error.into());
            }
            match action {
                InterpreterAction::NewFrame(input) => {
                    let depth = parent_depth + 1;
                    memory.new_child_context();
                    match frame::init_frame(&mut self.ctx, &self.precompiles, depth, input)? {
                        ItemOrResult::Item(child) => frames.push(child),
                        ItemOrResult::Result(result) => {
                            memory.free_child_context();
                            let parent = frames.last_mut().expect("parent is on the stack");
                            frame::insert_outcome(parent, &mut memory, result);
                        }
                    }
                }
                InterpreterAction::Return(result) => {
                    trace!(result = ?result.result, depth = parent_depth, "frame return");
                    let finished = frames.pop().expect("frame to pop");
                    let outcome = frame::finish_frame(&mut self.ctx, finished, result);
                    match frames.last_mut() {
                        Some(parent) => {
                            memory.free_child_context();
                            frame::insert_outcome(parent, &mut memory, outcome);
                        }
                        None => return Ok(outcome),
                    }
                }
            }
        }
    }

    /// Settles refunds, applies queued deletions and shapes the final
    /// result. On a transaction-fatal error the journal is rolled back.
    fn finish_transaction(
        &mut self,
        gas_limit: u64,
        outcome: Result<FrameResult, EvmError>,
    ) -> Result<ExecutionResult, EvmError> {
        let mut outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                self.ctx.journal.abort();
                return Err(error);
            }
        };
        let spec = self.ctx.env.cfg.spec;
        let created_address = if outcome.result().result.is_ok() {
            outcome.created_address()
        } else {
            None
        };

        let result = outcome.result_mut();
        if result.result.is_error() {
            result.gas.spend_all();
        }
        if result.result.is_ok() {
            result.gas.set_final_refund(spec.is_enabled_in(SpecId::LONDON));
        } else {
            // A failed transaction reverts its refund counter with the rest
            // of the journal.
            result.gas.set_refund(0);
        }

        let logs = self.ctx.journal.finalize();
        let success = result.result.is_ok();
        let revert_reason = (result.result == InstructionResult::Revert)
            .then(|| result.output.clone());

        debug!(
            success,
            reason = ?result.result,
            gas_used = result.gas.spent_sub_refunded(),
            "transaction end"
        );
        debug_assert_eq!(result.gas.limit(), gas_limit);
        Ok(ExecutionResult {
            success,
            reason: result.result,
            gas_used: result.gas.spent_sub_refunded(),
            gas_refunded: result.gas.refunded() as u64,
            output: if success {
                result.output.clone()
            } else {
                revert_reason.clone().unwrap_or_else(Bytes::new)
            },
            logs: if success { logs } else { Vec::new() },
            created_address,
            revert_reason,
        })
    }
}
