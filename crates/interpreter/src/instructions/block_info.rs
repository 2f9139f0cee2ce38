//! Block-context handlers. Values come straight from the host environment.

use crate::{host::Host, interpreter::InstructionContext};
use primitives::{SpecId, U256};

pub fn coinbase<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let coinbase = ctx.host.env().block.coinbase;
    push!(ctx, coinbase.into_word().into());
    ctx.interpreter.next();
}

pub fn timestamp<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let timestamp = ctx.host.env().block.timestamp;
    push!(ctx, U256::from(timestamp));
    ctx.interpreter.next();
}

pub fn block_number<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let number = ctx.host.env().block.number;
    push!(ctx, U256::from(number));
    ctx.interpreter.next();
}

/// `DIFFICULTY` before the merge, `PREVRANDAO` after.
pub fn difficulty<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let block = &ctx.host.env().block;
    let value = if ctx.interpreter.spec.is_enabled_in(SpecId::MERGE) {
        block.prevrandao.unwrap_or_default().into()
    } else {
        block.difficulty
    };
    push!(ctx, value);
    ctx.interpreter.next();
}

pub fn gaslimit<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let gas_limit = ctx.host.env().block.gas_limit;
    push!(ctx, U256::from(gas_limit));
    ctx.interpreter.next();
}

/// EIP-1344: `CHAINID`.
pub fn chainid<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, ISTANBUL);
    let chain_id = ctx.host.env().cfg.chain_id;
    push!(ctx, U256::from(chain_id));
    ctx.interpreter.next();
}

/// EIP-3198: `BASEFEE`.
pub fn basefee<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, LONDON);
    let basefee = ctx.host.env().block.basefee;
    push!(ctx, U256::from(basefee));
    ctx.interpreter.next();
}

/// EIP-7516: `BLOBBASEFEE`.
pub fn blob_basefee<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CANCUN);
    let blob_base_fee = ctx.host.env().block.blob_base_fee;
    push!(ctx, U256::from(blob_base_fee));
    ctx.interpreter.next();
}
