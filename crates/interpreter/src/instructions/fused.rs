//! Handlers for the analyzer's fused PUSH+op slots. Each behaves exactly
//! like the pair it replaces; the immediate is the first operand, the prior
//! stack top the second.

use crate::{host::Host, interpreter::InstructionContext};
use primitives::U256;

pub fn push_add<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm.wrapping_add(*top);
    ctx.interpreter.skip_metadata();
}

pub fn push_mul<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm.wrapping_mul(*top);
    ctx.interpreter.skip_metadata();
}

pub fn push_sub<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm.wrapping_sub(*top);
    ctx.interpreter.skip_metadata();
}

pub fn push_div<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm.checked_div(*top).unwrap_or_default();
    ctx.interpreter.skip_metadata();
}

pub fn push_and<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm & *top;
    ctx.interpreter.skip_metadata();
}

pub fn push_or<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm | *top;
    ctx.interpreter.skip_metadata();
}

pub fn push_xor<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let imm = U256::from(ctx.interpreter.metadata());
    popn_top!([], top, ctx);
    *top = imm ^ *top;
    ctx.interpreter.skip_metadata();
}

/// Fused PUSH+JUMP. The destination slot was validated and resolved at
/// analysis time.
pub fn push_jump<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    ctx.interpreter.idx = ctx.interpreter.metadata() as usize;
}

/// Fused PUSH+JUMPI.
pub fn push_jumpi<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([cond], ctx);
    if !cond.is_zero() {
        ctx.interpreter.idx = ctx.interpreter.metadata() as usize;
    } else {
        ctx.interpreter.skip_metadata();
    }
}
