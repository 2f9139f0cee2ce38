//! Transaction-context handlers.

use crate::{host::Host, interpreter::InstructionContext};
use primitives::U256;

pub fn origin<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let origin = ctx.host.env().tx.caller;
    push!(ctx, origin.into_word().into());
    ctx.interpreter.next();
}

pub fn gasprice<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let gas_price = ctx.host.env().tx.gas_price;
    push!(ctx, U256::from(gas_price));
    ctx.interpreter.next();
}

/// EIP-4844: `BLOBHASH` indexes the transaction's versioned blob hashes.
pub fn blob_hash<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CANCUN);
    popn_top!([], index, ctx);
    let hashes = &ctx.host.env().tx.blob_hashes;
    *index = match usize::try_from(*index) {
        Ok(index) if index < hashes.len() => hashes[index].into(),
        _ => U256::ZERO,
    };
    ctx.interpreter.next();
}
