//! Control-flow handlers, including the block-entry validation that backs
//! the whole gas/stack model.

use crate::{
    host::Host,
    interpreter::InstructionContext,
    InstructionResult,
};
use primitives::{Bytes, U256, STACK_LIMIT};

/// Charges a basic block's static gas and validates its stack bounds in one
/// shot. `JUMPDEST` slots and synthetic `BEGINBLOCK` slots both land here;
/// everything between two block entries runs without per-instruction
/// checks.
pub fn begin_block<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let interp = &mut *ctx.interpreter;
    let block = interp.stream.block(interp.metadata() as usize);
    if !interp.gas.record_cost(block.gas_cost as u64) {
        interp.halt_oog();
        return;
    }
    let len = interp.stack.len();
    if len < block.stack_req as usize {
        interp.halt(InstructionResult::StackUnderflow);
        return;
    }
    if len + block.stack_max_growth as usize > STACK_LIMIT {
        interp.halt(InstructionResult::StackOverflow);
        return;
    }
    interp.skip_metadata();
}

/// Dynamic `JUMP`: the target comes from the stack and is validated against
/// the jump table.
pub fn jump<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([target], ctx);
    jump_inner(ctx.interpreter, target);
}

/// Dynamic `JUMPI`.
pub fn jumpi<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([target, cond], ctx);
    if !cond.is_zero() {
        jump_inner(ctx.interpreter, target);
    } else {
        ctx.interpreter.next();
    }
}

#[inline(always)]
fn jump_inner(interp: &mut crate::Interpreter, target: U256) {
    let slot = usize::try_from(target)
        .ok()
        .and_then(|pc| interp.stream.jump_table().lookup(pc));
    match slot {
        Some(slot) => interp.idx = slot,
        None => interp.halt(InstructionResult::InvalidJump),
    }
}

/// `PC` pushes the bytecode program counter recorded at analysis time, not
/// the stream index.
pub fn pc<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let pc = ctx.interpreter.metadata();
    push!(ctx, U256::from(pc));
    ctx.interpreter.skip_metadata();
}

#[inline]
fn return_inner<H: Host + ?Sized>(ctx: InstructionContext<'_, H>, result: InstructionResult) {
    popn!([offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    // Offset is ignored for empty output.
    let mut output = Bytes::new();
    if len != 0 {
        let offset = as_usize_or_fail!(ctx, offset);
        resize_memory!(ctx, offset, len);
        output = Bytes::copy_from_slice(ctx.memory.slice(offset, len));
    }
    ctx.interpreter.return_with(result, output);
}

pub fn ret<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    return_inner(ctx, InstructionResult::Return);
}

/// EIP-140: `REVERT` halts preserving remaining gas.
pub fn revert<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, BYZANTIUM);
    return_inner(ctx, InstructionResult::Revert);
}

pub fn stop<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    ctx.interpreter.halt(InstructionResult::Stop);
}

/// The designated invalid opcode (0xFE).
pub fn invalid<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    ctx.interpreter.halt(InstructionResult::InvalidFEOpcode);
}

/// Slots that should be unreachable: undefined opcodes are rejected at
/// analysis, and metadata slots are never dispatched on.
pub fn unknown<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    ctx.interpreter.halt(InstructionResult::OpcodeNotFound);
}

#[cfg(test)]
mod tests {
    use crate::instructions::testing::{run_block, run_block_result};
    use crate::InstructionResult;
    use primitives::U256;

    #[test]
    fn invalid_dynamic_jump_halts() {
        // PUSH1 5, PUSH1 1, ADD, JUMP → target 6 is not a JUMPDEST. The
        // jump target is computed, so analysis cannot reject it.
        let result = run_block_result(&[0x60, 0x05, 0x60, 0x01, 0x01, 0x56, 0x00]);
        assert_eq!(result.result, InstructionResult::InvalidJump);
    }

    #[test]
    fn dynamic_jump_to_jumpdest() {
        // PUSH1 7, PUSH1 0, ADD, JUMP, STOP, JUMPDEST@7, PUSH1 3, STOP
        let interp = run_block(&[
            0x60, 0x07, 0x60, 0x00, 0x01, 0x56, 0x00, 0x5b, 0x60, 0x03, 0x00,
        ]);
        assert_eq!(interp.stack.data(), &[U256::from(3)]);
    }

    #[test]
    fn pc_reports_bytecode_positions() {
        // PC@0, PUSH1 0, POP, PC@4, STOP → [0, 4]
        let interp = run_block(&[0x58, 0x60, 0x00, 0x50, 0x58, 0x00]);
        assert_eq!(interp.stack.data(), &[U256::ZERO, U256::from(4)]);
    }

    #[test]
    fn untaken_trailing_jumpi_stops_implicitly() {
        // JUMPDEST, PUSH1 0, PUSH1 0, JUMPI: falls off the end.
        let interp = run_block(&[0x5b, 0x60, 0x00, 0x60, 0x00, 0x57]);
        assert!(interp.stack.is_empty());
    }

    #[test]
    fn out_of_gas_at_block_entry_consumes_everything() {
        // PUSH1 1, PUSH1 2, ADD, STOP costs 9; give it 5.
        let result =
            crate::instructions::testing::run_with_gas(&[0x60, 0x01, 0x60, 0x02, 0x01, 0x00], 5);
        assert_eq!(result.result, InstructionResult::OutOfGas);
        assert_eq!(result.gas.remaining(), 0);
    }
}
