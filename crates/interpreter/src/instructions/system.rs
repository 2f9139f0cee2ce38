//! Frame environment handlers: call data, code, return data, hashing.

use crate::{gas, host::Host, interpreter::InstructionContext, InstructionResult};
use primitives::{keccak256, B256, U256, KECCAK_EMPTY};

pub fn keccak256_op<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([offset], top, ctx);
    let len = as_usize_or_fail!(ctx, *top);
    gas_or_fail!(ctx, gas::keccak256_word_cost(len as u64));
    let hash = if len == 0 {
        KECCAK_EMPTY
    } else {
        let offset = as_usize_or_fail!(ctx, offset);
        resize_memory!(ctx, offset, len);
        keccak256(ctx.memory.slice(offset, len))
    };
    *top = hash.into();
    ctx.interpreter.next();
}

pub fn address<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let address = ctx.interpreter.input.target_address;
    push!(ctx, address.into_word().into());
    ctx.interpreter.next();
}

pub fn caller<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let caller = ctx.interpreter.input.caller_address;
    push!(ctx, caller.into_word().into());
    ctx.interpreter.next();
}

pub fn callvalue<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let value = ctx.interpreter.input.call_value;
    push!(ctx, value);
    ctx.interpreter.next();
}

pub fn calldataload<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([], top, ctx);
    let input = &ctx.interpreter.input.input;
    let offset = as_usize_saturated!(*top);
    let mut word = B256::ZERO;
    if offset < input.len() {
        let count = 32.min(input.len() - offset);
        word[..count].copy_from_slice(&input[offset..offset + count]);
    }
    *top = word.into();
    ctx.interpreter.next();
}

pub fn calldatasize<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let len = ctx.interpreter.input.input.len();
    push!(ctx, U256::from(len));
    ctx.interpreter.next();
}

pub fn calldatacopy<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([memory_offset, data_offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    gas_or_fail!(ctx, gas::copy_cost(len as u64));
    if len == 0 {
        ctx.interpreter.next();
        return;
    }
    let memory_offset = as_usize_or_fail!(ctx, memory_offset);
    let data_offset = as_usize_saturated!(data_offset);
    resize_memory!(ctx, memory_offset, len);
    let input = ctx.interpreter.input.input.clone();
    ctx.memory.set_data(memory_offset, data_offset, len, &input);
    ctx.interpreter.next();
}

pub fn codesize<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let len = ctx.interpreter.stream.code().len();
    push!(ctx, U256::from(len));
    ctx.interpreter.next();
}

pub fn codecopy<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn!([memory_offset, code_offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    gas_or_fail!(ctx, gas::copy_cost(len as u64));
    if len == 0 {
        ctx.interpreter.next();
        return;
    }
    let memory_offset = as_usize_or_fail!(ctx, memory_offset);
    let code_offset = as_usize_saturated!(code_offset);
    resize_memory!(ctx, memory_offset, len);
    let code = ctx.interpreter.stream.code().clone();
    ctx.memory.set_data(memory_offset, code_offset, len, &code);
    ctx.interpreter.next();
}

/// EIP-211: `RETURNDATASIZE`.
pub fn returndatasize<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, BYZANTIUM);
    let len = ctx.interpreter.return_data.len();
    push!(ctx, U256::from(len));
    ctx.interpreter.next();
}

/// EIP-211: `RETURNDATACOPY` faults on out-of-bounds reads, unlike the
/// other copies.
pub fn returndatacopy<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, BYZANTIUM);
    popn!([memory_offset, data_offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    gas_or_fail!(ctx, gas::copy_cost(len as u64));
    let data_offset = as_usize_saturated!(data_offset);
    let data_end = data_offset.saturating_add(len);
    if data_end > ctx.interpreter.return_data.len() {
        ctx.interpreter.halt(InstructionResult::OutOfOffset);
        return;
    }
    if len != 0 {
        let memory_offset = as_usize_or_fail!(ctx, memory_offset);
        resize_memory!(ctx, memory_offset, len);
        let data = ctx.interpreter.return_data.clone();
        ctx.memory.set_data(memory_offset, data_offset, len, &data);
    }
    ctx.interpreter.next();
}

pub fn gas<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let remaining = ctx.interpreter.gas.remaining();
    push!(ctx, U256::from(remaining));
    ctx.interpreter.next();
}

#[cfg(test)]
mod tests {
    use crate::instructions::testing::{run_block, run_block_with_input};
    use primitives::{keccak256, Bytes, U256};

    #[test]
    fn keccak_of_stored_word() {
        // MSTORE(0, 7); KECCAK256(0, 32)
        let interp = run_block(&[
            0x60, 0x07, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0x20, 0x00,
        ]);
        let expected = keccak256(U256::from(7).to_be_bytes::<32>());
        assert_eq!(interp.stack.data(), &[U256::from_be_bytes(expected.0)]);
    }

    #[test]
    fn calldataload_zero_pads() {
        // CALLDATALOAD(1) over 2 bytes of input.
        let interp = run_block_with_input(
            &[0x60, 0x01, 0x35, 0x00],
            Bytes::from_static(&[0xaa, 0xbb]),
        );
        let mut expected = [0u8; 32];
        expected[0] = 0xbb;
        assert_eq!(
            interp.stack.data(),
            &[U256::from_be_bytes::<32>(expected)]
        );
    }

    #[test]
    fn gas_observes_exact_remaining() {
        // GAS, STOP with 100 gas: the GAS block costs 2.
        let interp = crate::instructions::testing::run_with_gas_ok(&[0x5a, 0x00], 100);
        assert_eq!(interp.stack.data(), &[U256::from(98)]);
    }
}
