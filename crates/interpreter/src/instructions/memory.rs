//! Linear-memory handlers. Expansion gas is charged before any write.

use crate::{gas, host::Host, interpreter::InstructionContext};
use primitives::U256;

pub fn mload<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([], top, ctx);
    let offset = as_usize_or_fail!(ctx, *top);
    resize_memory!(ctx, offset, 32);
    *top = ctx.memory.get_word(offset).into();
    ctx.interpreter.next();
}

pub fn mstore<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([offset, value], ctx);
    let offset = as_usize_or_fail!(ctx, offset);
    resize_memory!(ctx, offset, 32);
    ctx.memory.set_word(offset, value);
    ctx.interpreter.next();
}

pub fn mstore8<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([offset, value], ctx);
    let offset = as_usize_or_fail!(ctx, offset);
    resize_memory!(ctx, offset, 1);
    ctx.memory.set_byte(offset, value.byte(0));
    ctx.interpreter.next();
}

pub fn msize<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    push!(ctx, U256::from(ctx.memory.len()));
    ctx.interpreter.next();
}

/// EIP-5656: `MCOPY`.
pub fn mcopy<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CANCUN);
    popn!([dst, src, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    gas_or_fail!(ctx, gas::copy_cost(len as u64));
    if len != 0 {
        let dst = as_usize_or_fail!(ctx, dst);
        let src = as_usize_or_fail!(ctx, src);
        resize_memory!(ctx, core::cmp::max(dst, src), len);
        ctx.memory.copy(dst, src, len);
    }
    ctx.interpreter.next();
}
