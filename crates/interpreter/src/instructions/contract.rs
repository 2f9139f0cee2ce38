//! CALL-family and CREATE-family handlers. These never recurse: they hand a
//! [`FrameInput`] to the execution loop and the parent resumes when the
//! loop feeds the child's outcome back in.

use crate::{
    gas,
    host::{AccountLoad, Host},
    interpreter::InstructionContext,
    interpreter_action::{
        CallInputs, CallScheme, CallValue, CreateInputs, CreateScheme, FrameInput,
        InterpreterAction,
    },
    InstructionResult,
};
use core::{cmp::min, ops::Range};
use primitives::{Bytes, SpecId, B256, U256};
use state::StateLoad;

/// Pops the argument and return ranges of a call, expanding memory for
/// both and snapshotting the input bytes.
pub fn get_memory_input_and_out_ranges<H: Host + ?Sized>(
    ctx: &mut InstructionContext<'_, H>,
) -> Option<(Bytes, Range<usize>)> {
    popn!([in_offset, in_len, out_offset, out_len], ctx);

    let in_len = as_usize_or_fail!(ctx, in_len, None);
    let input = if in_len != 0 {
        let in_offset = as_usize_or_fail!(ctx, in_offset, None);
        resize_memory!(ctx, in_offset, in_len, None);
        Bytes::copy_from_slice(ctx.memory.slice(in_offset, in_len))
    } else {
        Bytes::new()
    };

    let out_len = as_usize_or_fail!(ctx, out_len, None);
    let out_range = if out_len != 0 {
        let out_offset = as_usize_or_fail!(ctx, out_offset, None);
        resize_memory!(ctx, out_offset, out_len, None);
        out_offset..out_offset + out_len
    } else {
        // Sentinel for "no return copy requested".
        usize::MAX..usize::MAX
    };
    Some((input, out_range))
}

/// Charges the dynamic call cost and applies EIP-150 gas forwarding.
pub fn calc_call_gas<H: Host + ?Sized>(
    ctx: &mut InstructionContext<'_, H>,
    account_load: StateLoad<AccountLoad>,
    transfers_value: bool,
    local_gas_limit: u64,
    new_account_accounting: bool,
) -> Option<u64> {
    let spec = ctx.interpreter.spec;
    let cost = gas::call_dynamic_cost(
        spec,
        transfers_value,
        account_load.is_cold,
        new_account_accounting && account_load.data.is_empty,
    );
    gas!(ctx, cost, None);

    // EIP-150: the caller keeps at least 1/64 of its remaining gas.
    let gas_limit = if spec.is_enabled_in(SpecId::TANGERINE) {
        min(
            ctx.interpreter.gas.remaining_63_of_64_parts(),
            local_gas_limit,
        )
    } else {
        local_gas_limit
    };
    Some(gas_limit)
}

pub fn call<H: Host + ?Sized>(mut ctx: InstructionContext<'_, H>) {
    popn!([local_gas_limit, to, value], ctx);
    let to = pop_address_word(to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let has_transfer = !value.is_zero();
    if ctx.interpreter.is_static && has_transfer {
        ctx.interpreter
            .halt(InstructionResult::CallNotAllowedInsideStatic);
        return;
    }

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(&mut ctx) else {
        return;
    };
    let Some(account_load) = ctx.host.load_account(to) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let Some(mut gas_limit) =
        calc_call_gas(&mut ctx, account_load, has_transfer, local_gas_limit, true)
    else {
        return;
    };

    // Reserve the forwarded gas; it comes back with the child's outcome.
    gas!(ctx, gas_limit);
    if has_transfer {
        gas_limit = gas_limit.saturating_add(gas::CALL_STIPEND);
    }

    let caller = ctx.interpreter.input.target_address;
    let is_static = ctx.interpreter.is_static;
    ctx.interpreter.next();
    ctx.interpreter.action = Some(InterpreterAction::NewFrame(FrameInput::Call(Box::new(
        CallInputs {
            input,
            gas_limit,
            target_address: to,
            bytecode_address: to,
            caller,
            value: CallValue::Transfer(value),
            scheme: CallScheme::Call,
            is_static,
            return_memory_offset,
        },
    ))));
}

pub fn call_code<H: Host + ?Sized>(mut ctx: InstructionContext<'_, H>) {
    popn!([local_gas_limit, to, value], ctx);
    let to = pop_address_word(to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);
    let has_transfer = !value.is_zero();

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(&mut ctx) else {
        return;
    };
    let Some(account_load) = ctx.host.load_account(to) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let Some(mut gas_limit) =
        calc_call_gas(&mut ctx, account_load, has_transfer, local_gas_limit, false)
    else {
        return;
    };

    gas!(ctx, gas_limit);
    if has_transfer {
        gas_limit = gas_limit.saturating_add(gas::CALL_STIPEND);
    }

    // Executes the callee's code against the caller's own storage; value is
    // checked against the caller's balance but stays put.
    let this = ctx.interpreter.input.target_address;
    let is_static = ctx.interpreter.is_static;
    ctx.interpreter.next();
    ctx.interpreter.action = Some(InterpreterAction::NewFrame(FrameInput::Call(Box::new(
        CallInputs {
            input,
            gas_limit,
            target_address: this,
            bytecode_address: to,
            caller: this,
            value: CallValue::Transfer(value),
            scheme: CallScheme::CallCode,
            is_static,
            return_memory_offset,
        },
    ))));
}

pub fn delegate_call<H: Host + ?Sized>(mut ctx: InstructionContext<'_, H>) {
    check!(ctx, HOMESTEAD);
    popn!([local_gas_limit, to], ctx);
    let to = pop_address_word(to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(&mut ctx) else {
        return;
    };
    let Some(account_load) = ctx.host.load_account(to) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let Some(gas_limit) = calc_call_gas(&mut ctx, account_load, false, local_gas_limit, false)
    else {
        return;
    };

    gas!(ctx, gas_limit);

    // Caller and value pass through unchanged.
    let this = ctx.interpreter.input.target_address;
    let parent_caller = ctx.interpreter.input.caller_address;
    let parent_value = ctx.interpreter.input.call_value;
    let is_static = ctx.interpreter.is_static;
    ctx.interpreter.next();
    ctx.interpreter.action = Some(InterpreterAction::NewFrame(FrameInput::Call(Box::new(
        CallInputs {
            input,
            gas_limit,
            target_address: this,
            bytecode_address: to,
            caller: parent_caller,
            value: CallValue::Apparent(parent_value),
            scheme: CallScheme::DelegateCall,
            is_static,
            return_memory_offset,
        },
    ))));
}

pub fn static_call<H: Host + ?Sized>(mut ctx: InstructionContext<'_, H>) {
    check!(ctx, BYZANTIUM);
    popn!([local_gas_limit, to], ctx);
    let to = pop_address_word(to);
    let local_gas_limit = u64::try_from(local_gas_limit).unwrap_or(u64::MAX);

    let Some((input, return_memory_offset)) = get_memory_input_and_out_ranges(&mut ctx) else {
        return;
    };
    let Some(account_load) = ctx.host.load_account(to) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let Some(gas_limit) = calc_call_gas(&mut ctx, account_load, false, local_gas_limit, true)
    else {
        return;
    };

    gas!(ctx, gas_limit);

    let caller = ctx.interpreter.input.target_address;
    ctx.interpreter.next();
    ctx.interpreter.action = Some(InterpreterAction::NewFrame(FrameInput::Call(Box::new(
        CallInputs {
            input,
            gas_limit,
            target_address: to,
            bytecode_address: to,
            caller,
            value: CallValue::Transfer(U256::ZERO),
            scheme: CallScheme::StaticCall,
            is_static: true,
            return_memory_offset,
        },
    ))));
}

pub fn create<const IS_CREATE2: bool, H: Host + ?Sized>(mut ctx: InstructionContext<'_, H>) {
    require_non_staticcall!(ctx);
    // EIP-1014: skinny CREATE2.
    if IS_CREATE2 {
        check!(ctx, PETERSBURG);
    }

    popn!([value, code_offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);

    let mut init_code = Bytes::new();
    if len != 0 {
        // EIP-3860: limit and meter init code.
        if ctx.interpreter.spec.is_enabled_in(SpecId::SHANGHAI) {
            let max_initcode_size = ctx.host.env().cfg.max_initcode_size();
            if len > max_initcode_size {
                ctx.interpreter
                    .halt(InstructionResult::CreateInitCodeSizeLimit);
                return;
            }
            gas!(ctx, gas::initcode_cost(len as u64));
        }
        let code_offset = as_usize_or_fail!(ctx, code_offset);
        resize_memory!(ctx, code_offset, len);
        init_code = Bytes::copy_from_slice(ctx.memory.slice(code_offset, len));
    }

    let scheme = if IS_CREATE2 {
        popn!([salt], ctx);
        gas_or_fail!(ctx, gas::create2_hash_cost(len as u64));
        CreateScheme::Create2 {
            salt: B256::from(salt),
        }
    } else {
        CreateScheme::Create
    };

    let mut gas_limit = ctx.interpreter.gas.remaining();
    // EIP-150 withholds 1/64 from creates as well.
    if ctx.interpreter.spec.is_enabled_in(SpecId::TANGERINE) {
        gas_limit -= gas_limit / 64;
    }
    gas!(ctx, gas_limit);

    let caller = ctx.interpreter.input.target_address;
    ctx.interpreter.next();
    ctx.interpreter.action = Some(InterpreterAction::NewFrame(FrameInput::Create(Box::new(
        CreateInputs {
            caller,
            scheme,
            value,
            init_code,
            gas_limit,
        },
    ))));
}

#[inline]
fn pop_address_word(value: U256) -> primitives::Address {
    primitives::Address::from_word(B256::from(value))
}
