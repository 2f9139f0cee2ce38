//! Stack manipulation handlers.

use crate::{host::Host, interpreter::InstructionContext};
use primitives::U256;

pub fn pop<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([_value], ctx);
    ctx.interpreter.next();
}

/// EIP-3855: `PUSH0`.
pub fn push0<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, SHANGHAI);
    push!(ctx, U256::ZERO);
    ctx.interpreter.next();
}

/// `PUSH1..PUSH32` whose immediate fit the metadata slot inline.
pub fn push_inline<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let value = ctx.interpreter.metadata();
    push!(ctx, U256::from(value));
    ctx.interpreter.skip_metadata();
}

/// `PUSH9..PUSH32` whose immediate lives in the constants side table.
pub fn push_const<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let index = ctx.interpreter.metadata() as usize;
    let value = ctx.interpreter.stream.constant(index);
    push!(ctx, value);
    ctx.interpreter.skip_metadata();
}

pub fn dup<const N: usize, H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    // SAFETY: block-entry validation guarantees depth and capacity.
    unsafe { ctx.interpreter.stack.dup(N) };
    ctx.interpreter.next();
}

pub fn swap<const N: usize, H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    // SAFETY: block-entry validation guarantees the depth.
    unsafe { ctx.interpreter.stack.swap(N) };
    ctx.interpreter.next();
}
