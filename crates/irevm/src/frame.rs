//! Frame construction and result plumbing for the execution loop.
//!
//! A frame pairs an interpreter with the journal checkpoint taken at its
//! entry. `init_frame` performs everything that happens before the first
//! instruction (depth check, value transfer, precompile shortcut, code
//! analysis); `finish_frame` settles the checkpoint and, for creates,
//! installs the returned code; `insert_outcome` feeds a child's result back
//! into its parent.

use crate::{context::EvmContext, precompile::PrecompileSet, EvmError};
use bytecode::{analyze, AnalysisConfig, AnalysisError};
use core::cmp::min;
use core::ops::Range;
use interpreter::{
    gas, CallInputs, CallValue, CreateInputs, CreateScheme, FrameInput, Gas, InputsImpl,
    InstructionResult, Interpreter, InterpreterResult, SharedMemory,
};
use primitives::{keccak256, Address, Bytes, SpecId, U256, CALL_STACK_LIMIT};
use state::{StateBackend, TransferError};
use std::sync::Arc;
use tracing::trace;

/// Either a constructed frame to push, or an outcome produced without
/// running any bytecode.
pub enum ItemOrResult<I, R> {
    Item(I),
    Result(R),
}

/// Kind-specific frame data.
#[derive(Clone, Debug)]
pub enum FrameData {
    Call {
        /// Caller-memory range the return data lands in.
        return_memory_range: Range<usize>,
    },
    Create {
        /// Address of the account being created.
        created_address: Address,
    },
}

/// One entry of the execution loop's frame stack.
#[derive(Debug)]
pub struct Frame {
    pub interpreter: Interpreter,
    pub checkpoint: state::JournalCheckpoint,
    pub depth: usize,
    pub data: FrameData,
}

/// Outcome of a finished call frame.
#[derive(Clone, Debug)]
pub struct CallOutcome {
    pub result: InterpreterResult,
    pub memory_offset: Range<usize>,
}

/// Outcome of a finished create frame.
#[derive(Clone, Debug)]
pub struct CreateOutcome {
    pub result: InterpreterResult,
    pub address: Option<Address>,
}

/// Outcome of any finished frame.
#[derive(Clone, Debug)]
pub enum FrameResult {
    Call(CallOutcome),
    Create(CreateOutcome),
}

impl FrameResult {
    /// The interpreter result inside.
    pub fn result(&self) -> &InterpreterResult {
        match self {
            Self::Call(outcome) => &outcome.result,
            Self::Create(outcome) => &outcome.result,
        }
    }

    /// Mutable access to the interpreter result.
    pub fn result_mut(&mut self) -> &mut InterpreterResult {
        match self {
            Self::Call(outcome) => &mut outcome.result,
            Self::Create(outcome) => &mut outcome.result,
        }
    }

    /// Created address, for successful creates.
    pub fn created_address(&self) -> Option<Address> {
        match self {
            Self::Call(_) => None,
            Self::Create(outcome) => outcome.address,
        }
    }
}

/// Maps a structural analysis error onto the fault the caller observes.
fn analysis_fault(error: AnalysisError) -> InstructionResult {
    match error {
        AnalysisError::OpcodeNotDefined { .. } | AnalysisError::TruncatedPush { .. } => {
            InstructionResult::OpcodeNotFound
        }
        AnalysisError::InvalidJumpDestination { .. } => InstructionResult::InvalidJump,
        AnalysisError::CodeSizeLimit { .. } => InstructionResult::CreateContractSizeLimit,
        AnalysisError::InitcodeSizeLimit { .. } => InstructionResult::CreateInitCodeSizeLimit,
    }
}

/// Initializes a frame from an input, or produces the outcome directly when
/// no bytecode needs to run.
pub fn init_frame<B: StateBackend, P: PrecompileSet>(
    ctx: &mut EvmContext<B>,
    precompiles: &P,
    depth: usize,
    input: FrameInput,
) -> Result<ItemOrResult<Frame, FrameResult>, EvmError> {
    match input {
        FrameInput::Call(inputs) => init_call_frame(ctx, precompiles, depth, inputs),
        FrameInput::Create(inputs) => init_create_frame(ctx, depth, inputs),
    }
}

fn init_call_frame<B: StateBackend, P: PrecompileSet>(
    ctx: &mut EvmContext<B>,
    precompiles: &P,
    depth: usize,
    inputs: Box<CallInputs>,
) -> Result<ItemOrResult<Frame, FrameResult>, EvmError> {
    let spec = ctx.env.cfg.spec;
    let gas = Gas::new(inputs.gas_limit);
    let return_memory_range = inputs.return_memory_offset.clone();
    let return_result = |result: InstructionResult, gas: Gas| {
        Ok(ItemOrResult::Result(FrameResult::Call(CallOutcome {
            result: InterpreterResult::new(result, Bytes::new(), gas),
            memory_offset: return_memory_range.clone(),
        })))
    };

    if depth >= CALL_STACK_LIMIT {
        return return_result(InstructionResult::CallTooDeep, gas);
    }

    let checkpoint = ctx.journal.checkpoint();

    // Transfer value. A zero-value CALL still touches the target.
    if let CallValue::Transfer(value) = inputs.value {
        match ctx
            .journal
            .transfer(inputs.caller, inputs.target_address, value)
        {
            Ok(None) => {}
            Ok(Some(TransferError::OutOfFunds)) => {
                ctx.journal.checkpoint_revert(checkpoint);
                return return_result(InstructionResult::OutOfFunds, gas);
            }
            Ok(Some(_)) => {
                ctx.journal.checkpoint_revert(checkpoint);
                return return_result(InstructionResult::OverflowPayment, gas);
            }
            Err(error) => return Err(error.into()),
        }
    }

    // Precompiles execute without bytecode.
    if let Some(result) =
        precompiles.run(&inputs.bytecode_address, &inputs.input, inputs.gas_limit, spec)
    {
        let result = match result {
            Ok(output) => {
                let mut gas = gas;
                let charged = gas.record_cost(output.gas_used);
                debug_assert!(charged, "precompile formula checked the limit");
                ctx.journal.checkpoint_commit();
                InterpreterResult::new(InstructionResult::Return, output.bytes, gas)
            }
            Err(error) => {
                ctx.journal.checkpoint_revert(checkpoint);
                let result = if error == crate::precompile::PrecompileError::OutOfGas {
                    InstructionResult::PrecompileOOG
                } else {
                    InstructionResult::PrecompileError
                };
                InterpreterResult::new(result, Bytes::new(), Gas::new_spent(inputs.gas_limit))
            }
        };
        trace!(address = %inputs.bytecode_address, result = ?result.result, "precompile call");
        return Ok(ItemOrResult::Result(FrameResult::Call(CallOutcome {
            result,
            memory_offset: return_memory_range,
        })));
    }

    let code = match ctx.journal.load_code(inputs.bytecode_address) {
        Ok(code) => code.data,
        Err(error) => return Err(error.into()),
    };

    // Calls into empty accounts succeed immediately.
    if code.is_empty() {
        ctx.journal.checkpoint_commit();
        return return_result(InstructionResult::Stop, gas);
    }

    let stream = match analyze_deployed(ctx, code) {
        Ok(stream) => stream,
        Err(error) => {
            ctx.journal.checkpoint_revert(checkpoint);
            return return_result(analysis_fault(error), Gas::new_spent(inputs.gas_limit));
        }
    };

    let interpreter = Interpreter::new(
        stream,
        InputsImpl {
            target_address: inputs.target_address,
            caller_address: inputs.caller,
            bytecode_address: inputs.bytecode_address,
            input: inputs.input.clone(),
            call_value: inputs.value.get(),
        },
        inputs.is_static,
        spec,
        inputs.gas_limit,
    );
    trace!(target = %inputs.target_address, depth, gas = inputs.gas_limit, "call frame");
    Ok(ItemOrResult::Item(Frame {
        interpreter,
        checkpoint,
        depth,
        data: FrameData::Call {
            return_memory_range,
        },
    }))
}

fn init_create_frame<B: StateBackend>(
    ctx: &mut EvmContext<B>,
    depth: usize,
    inputs: Box<CreateInputs>,
) -> Result<ItemOrResult<Frame, FrameResult>, EvmError> {
    let spec = ctx.env.cfg.spec;
    let gas = Gas::new(inputs.gas_limit);
    let return_result = |result: InstructionResult, gas: Gas| {
        Ok(ItemOrResult::Result(FrameResult::Create(CreateOutcome {
            result: InterpreterResult::new(result, Bytes::new(), gas),
            address: None,
        })))
    };

    if depth >= CALL_STACK_LIMIT {
        return return_result(InstructionResult::CallTooDeep, gas);
    }

    // Caller balance gates the endowment before the nonce burns.
    let caller_balance = match ctx.journal.load_account(inputs.caller) {
        Ok(load) => load.data.info.balance,
        Err(error) => return Err(error.into()),
    };
    if caller_balance < inputs.value {
        return return_result(InstructionResult::OutOfFunds, gas);
    }

    let Some(new_nonce) = ctx.journal.inc_nonce(inputs.caller) else {
        return return_result(InstructionResult::NonceOverflow, gas);
    };
    let old_nonce = new_nonce - 1;

    let created_address = match inputs.scheme {
        CreateScheme::Create => inputs.caller.create(old_nonce),
        CreateScheme::Create2 { salt } => inputs
            .caller
            .create2(salt, keccak256(&inputs.init_code)),
    };

    // Warm the created address before the collision check.
    if let Err(error) = ctx.journal.load_account(created_address) {
        return Err(error.into());
    }

    let checkpoint = match ctx.journal.create_account_checkpoint(
        inputs.caller,
        created_address,
        inputs.value,
        spec,
    ) {
        Ok(checkpoint) => checkpoint,
        Err(TransferError::CreateCollision) => {
            return return_result(InstructionResult::CreateCollision, gas)
        }
        Err(TransferError::OutOfFunds) => {
            return return_result(InstructionResult::OutOfFunds, gas)
        }
        Err(TransferError::OverflowPayment) => {
            return return_result(InstructionResult::OverflowPayment, gas)
        }
    };

    // Init code is analyzed fresh: it runs once.
    let mut config = AnalysisConfig::initcode(spec);
    config.enable_fusion = !ctx.env.cfg.disable_fusion;
    config.max_size = ctx.env.cfg.max_initcode_size();
    let stream = match analyze(inputs.init_code.clone(), &config) {
        Ok(stream) => Arc::new(stream),
        Err(error) => {
            ctx.journal.checkpoint_revert(checkpoint);
            return return_result(analysis_fault(error), Gas::new_spent(inputs.gas_limit));
        }
    };

    let interpreter = Interpreter::new(
        stream,
        InputsImpl {
            target_address: created_address,
            caller_address: inputs.caller,
            bytecode_address: created_address,
            input: Bytes::new(),
            call_value: inputs.value,
        },
        false,
        spec,
        inputs.gas_limit,
    );
    trace!(created = %created_address, depth, "create frame");
    Ok(ItemOrResult::Item(Frame {
        interpreter,
        checkpoint,
        depth,
        data: FrameData::Create { created_address },
    }))
}

/// Analyzes deployed code through the content-addressed cache.
fn analyze_deployed<B: StateBackend>(
    ctx: &mut EvmContext<B>,
    code: Bytes,
) -> Result<Arc<bytecode::InstructionStream>, AnalysisError> {
    let spec = ctx.env.cfg.spec;
    let code_hash = keccak256(&code);
    if let Some(stream) = ctx.analyses.get(code_hash, spec) {
        return Ok(stream);
    }
    let mut config = AnalysisConfig::new(spec);
    config.enable_fusion = !ctx.env.cfg.disable_fusion;
    config.max_size = ctx.env.cfg.max_code_size();
    let stream = Arc::new(analyze(code, &config)?);
    ctx.analyses.insert(stream.clone());
    Ok(stream)
}

/// Settles a finished frame against the journal and shapes its outcome.
pub fn finish_frame<B: StateBackend>(
    ctx: &mut EvmContext<B>,
    frame: Frame,
    mut result: InterpreterResult,
) -> FrameResult {
    match frame.data {
        FrameData::Call {
            return_memory_range,
        } => {
            if result.result.is_ok() {
                ctx.journal.checkpoint_commit();
            } else {
                ctx.journal.checkpoint_revert(frame.checkpoint);
            }
            FrameResult::Call(CallOutcome {
                result,
                memory_offset: return_memory_range,
            })
        }
        FrameData::Create { created_address } => {
            return_create(ctx, frame.checkpoint, &mut result, created_address);
            FrameResult::Create(CreateOutcome {
                result,
                address: Some(created_address),
            })
        }
    }
}

/// Validates and installs the code returned by an init frame.
fn return_create<B: StateBackend>(
    ctx: &mut EvmContext<B>,
    checkpoint: state::JournalCheckpoint,
    result: &mut InterpreterResult,
    address: Address,
) {
    let spec = ctx.env.cfg.spec;
    if !result.result.is_ok() {
        ctx.journal.checkpoint_revert(checkpoint);
        return;
    }

    // EIP-3541: reject new code starting with 0xEF.
    if spec.is_enabled_in(SpecId::LONDON) && result.output.first() == Some(&0xef) {
        ctx.journal.checkpoint_revert(checkpoint);
        result.result = InstructionResult::CreateContractStartingWithEF;
        return;
    }

    // EIP-170: deployed code size limit.
    if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON)
        && result.output.len() > ctx.env.cfg.max_code_size()
    {
        ctx.journal.checkpoint_revert(checkpoint);
        result.result = InstructionResult::CreateContractSizeLimit;
        return;
    }

    let gas_for_code = result.output.len() as u64 * gas::CODEDEPOSIT;
    if !result.gas.record_cost(gas_for_code) {
        // EIP-2 point 3: without gas for the deposit the whole creation
        // fails; pre-Homestead the code is simply not installed.
        if spec.is_enabled_in(SpecId::HOMESTEAD) {
            ctx.journal.checkpoint_revert(checkpoint);
            result.result = InstructionResult::OutOfGas;
            return;
        }
        result.output = Bytes::new();
    }

    ctx.journal.checkpoint_commit();
    ctx.journal.set_code(address, result.output.clone());
    result.result = InstructionResult::Return;
}

/// Feeds a child frame's outcome into its suspended parent: success flag or
/// created address on the stack, return data buffer, gas reimbursement and
/// refunds, and the requested memory copy.
pub fn insert_outcome(parent: &mut Frame, memory: &mut SharedMemory, outcome: FrameResult) {
    let interpreter = &mut parent.interpreter;
    match outcome {
        FrameResult::Call(outcome) => {
            let child_gas = outcome.result.gas;
            let ins_result = outcome.result.result;

            interpreter.return_data = outcome.result.output.clone();

            let item = if ins_result.is_ok() {
                U256::from(1)
            } else {
                U256::ZERO
            };
            // Net stack change of a call is negative; this cannot overflow.
            let pushed = interpreter.stack.push(item);
            debug_assert!(pushed);

            if ins_result.is_ok_or_revert() {
                interpreter.gas.erase_cost(child_gas.remaining());
                let target_len = min(outcome.memory_offset.len(), outcome.result.output.len());
                if target_len != 0 {
                    let start = outcome.memory_offset.start;
                    memory.set(start, &outcome.result.output[..target_len]);
                }
            }
            if ins_result.is_ok() {
                interpreter.gas.record_refund(child_gas.refunded());
            }
        }
        FrameResult::Create(outcome) => {
            let child_gas = outcome.result.gas;
            let ins_result = outcome.result.result;

            // Only a revert exposes data through RETURNDATA (EIP-211).
            if ins_result == InstructionResult::Revert {
                interpreter.return_data = outcome.result.output.clone();
            } else {
                interpreter.return_data = Bytes::new();
            }

            if ins_result.is_ok_or_revert() {
                interpreter.gas.erase_cost(child_gas.remaining());
            }

            let item = if ins_result.is_ok() {
                interpreter.gas.record_refund(child_gas.refunded());
                outcome
                    .address
                    .expect("successful create has an address")
                    .into_word()
                    .into()
            } else {
                U256::ZERO
            };
            let pushed = interpreter.stack.push(item);
            debug_assert!(pushed);
        }
    }
}
