//! Handlers that reach state through the [`Host`]: balances, external code,
//! storage, transient storage, logs and self-destruct.

use crate::{
    gas,
    host::Host,
    interpreter::InstructionContext,
    InstructionResult,
};
use primitives::{Address, Bytes, Log, LogData, SpecId, B256, U256, BLOCK_HASH_HISTORY};

#[inline]
fn pop_address<H: Host + ?Sized>(ctx: &mut InstructionContext<'_, H>) -> Address {
    // SAFETY: block-entry validation guarantees the depth.
    let [value] = unsafe { ctx.interpreter.stack.popn::<1>() };
    Address::from_word(B256::from(value))
}

pub fn balance<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let mut ctx = ctx;
    let address = pop_address(&mut ctx);
    let Some(balance) = ctx.host.balance(address) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    gas!(ctx, gas::cold_account_surcharge(spec, balance.is_cold));
    push!(ctx, balance.data);
    ctx.interpreter.next();
}

/// EIP-1884: `SELFBALANCE` reads the executing account cheaply.
pub fn selfbalance<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, ISTANBUL);
    let address = ctx.interpreter.input.target_address;
    let Some(balance) = ctx.host.balance(address) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    push!(ctx, balance.data);
    ctx.interpreter.next();
}

pub fn extcodesize<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let mut ctx = ctx;
    let address = pop_address(&mut ctx);
    let Some(code) = ctx.host.code(address) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    gas!(ctx, gas::cold_account_surcharge(spec, code.is_cold));
    push!(ctx, U256::from(code.data.len()));
    ctx.interpreter.next();
}

/// EIP-1052: `EXTCODEHASH`.
pub fn extcodehash<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CONSTANTINOPLE);
    let mut ctx = ctx;
    let address = pop_address(&mut ctx);
    let Some(code_hash) = ctx.host.code_hash(address) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    gas!(ctx, gas::cold_account_surcharge(spec, code_hash.is_cold));
    push!(ctx, code_hash.data.into());
    ctx.interpreter.next();
}

pub fn extcodecopy<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let mut ctx = ctx;
    let address = pop_address(&mut ctx);
    popn!([memory_offset, code_offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    let Some(code) = ctx.host.code(address) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    gas!(ctx, gas::cold_account_surcharge(spec, code.is_cold));
    gas_or_fail!(ctx, gas::copy_cost(len as u64));
    if len != 0 {
        let memory_offset = as_usize_or_fail!(ctx, memory_offset);
        let code_offset = as_usize_saturated!(code_offset);
        resize_memory!(ctx, memory_offset, len);
        ctx.memory
            .set_data(memory_offset, code_offset, len, &code.data);
    }
    ctx.interpreter.next();
}

pub fn blockhash<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([], number, ctx);
    let requested = u64::try_from(*number).unwrap_or(u64::MAX);
    let current = ctx.host.env().block.number;
    let diff = current.saturating_sub(requested);
    if diff == 0 || diff > BLOCK_HASH_HISTORY {
        *number = U256::ZERO;
    } else {
        let Some(hash) = ctx.host.block_hash(requested) else {
            ctx.interpreter.halt_fatal();
            return;
        };
        *number = hash.into();
    }
    ctx.interpreter.next();
}

pub fn sload<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([], key, ctx);
    let address = ctx.interpreter.input.target_address;
    let Some(value) = ctx.host.sload(address, *key) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    gas!(ctx, gas::cold_sload_surcharge(spec, value.is_cold));
    *key = value.data;
    ctx.interpreter.next();
}

pub fn sstore<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    require_non_staticcall!(ctx);
    popn!([key, value], ctx);
    let address = ctx.interpreter.input.target_address;
    let Some(result) = ctx.host.sstore(address, key, value) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    let remaining = ctx.interpreter.gas.remaining();
    let Some(cost) = gas::sstore_cost(
        spec,
        result.data.original_value,
        result.data.present_value,
        result.data.new_value,
        remaining,
        result.is_cold,
    ) else {
        // EIP-1706 stipend sentry.
        ctx.interpreter.halt_oog();
        return;
    };
    gas!(ctx, cost);
    refund!(
        ctx,
        gas::sstore_refund(
            spec,
            result.data.original_value,
            result.data.present_value,
            result.data.new_value
        )
    );
    ctx.interpreter.next();
}

/// EIP-1153: `TLOAD`. Always warm, never persisted.
pub fn tload<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CANCUN);
    popn_top!([], key, ctx);
    let address = ctx.interpreter.input.target_address;
    *key = ctx.host.tload(address, *key);
    ctx.interpreter.next();
}

/// EIP-1153: `TSTORE`.
pub fn tstore<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CANCUN);
    require_non_staticcall!(ctx);
    popn!([key, value], ctx);
    let address = ctx.interpreter.input.target_address;
    ctx.host.tstore(address, key, value);
    ctx.interpreter.next();
}

pub fn log<const N: usize, H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    require_non_staticcall!(ctx);
    popn!([offset, len], ctx);
    let len = as_usize_or_fail!(ctx, len);
    gas_or_fail!(ctx, gas::log_data_cost(len as u64));
    let data = if len == 0 {
        Bytes::new()
    } else {
        let offset = as_usize_or_fail!(ctx, offset);
        resize_memory!(ctx, offset, len);
        Bytes::copy_from_slice(ctx.memory.slice(offset, len))
    };
    // SAFETY: block-entry validation covered the topics.
    let topics: [U256; N] = unsafe { ctx.interpreter.stack.popn::<N>() };
    let topics = topics.iter().map(|topic| B256::from(*topic)).collect();

    let log = Log {
        address: ctx.interpreter.input.target_address,
        data: LogData::new(topics, data).expect("at most four topics"),
    };
    ctx.host.log(log);
    ctx.interpreter.next();
}

pub fn selfdestruct<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    require_non_staticcall!(ctx);
    let mut ctx = ctx;
    let target = pop_address(&mut ctx);
    let address = ctx.interpreter.input.target_address;
    let Some(result) = ctx.host.selfdestruct(address, target) else {
        ctx.interpreter.halt_fatal();
        return;
    };
    let spec = ctx.interpreter.spec;
    // EIP-3529 removed the refund.
    if !spec.is_enabled_in(SpecId::LONDON) && !result.data.previously_destroyed {
        refund!(ctx, gas::SELFDESTRUCT);
    }
    gas!(
        ctx,
        gas::selfdestruct_dynamic_cost(spec, result.data, result.is_cold)
    );
    ctx.interpreter.halt(InstructionResult::SelfDestruct);
}

#[cfg(test)]
mod tests {
    use crate::{
        host::{DummyHost, Host},
        instructions::testing,
        interpreter::{InputsImpl, Interpreter},
        interpreter_action::{InterpreterAction, InterpreterResult},
        memory::SharedMemory,
        table::instruction_table,
        InstructionResult,
    };
    use bytecode::{analyze, AnalysisConfig};
    use primitives::{Address, Bytes, SpecId, U256};
    use state::{SStoreResult, StateLoad};
    use std::sync::Arc;

    /// Host whose every state access is cold exactly once, for exercising
    /// the EIP-2929 surcharge paths.
    #[derive(Default)]
    struct ColdHost {
        inner: DummyHost,
        warm_accounts: Vec<Address>,
        warm_slots: Vec<(Address, U256)>,
    }

    impl Host for ColdHost {
        fn env(&self) -> &primitives::Env {
            self.inner.env()
        }
        fn load_account(
            &mut self,
            address: Address,
        ) -> Option<StateLoad<crate::host::AccountLoad>> {
            let is_cold = !self.warm_accounts.contains(&address);
            if is_cold {
                self.warm_accounts.push(address);
            }
            Some(StateLoad::new(crate::host::AccountLoad { is_empty: true }, is_cold))
        }
        fn balance(&mut self, address: Address) -> Option<StateLoad<U256>> {
            let account = self.load_account(address)?;
            Some(StateLoad::new(U256::from(1234), account.is_cold))
        }
        fn code(&mut self, address: Address) -> Option<StateLoad<Bytes>> {
            let account = self.load_account(address)?;
            Some(StateLoad::new(Bytes::new(), account.is_cold))
        }
        fn code_hash(&mut self, address: Address) -> Option<StateLoad<primitives::B256>> {
            let account = self.load_account(address)?;
            Some(StateLoad::new(primitives::B256::ZERO, account.is_cold))
        }
        fn sload(&mut self, address: Address, key: U256) -> Option<StateLoad<U256>> {
            let is_cold = !self.warm_slots.contains(&(address, key));
            if is_cold {
                self.warm_slots.push((address, key));
            }
            Some(StateLoad::new(U256::from(9), is_cold))
        }
        fn sstore(
            &mut self,
            address: Address,
            key: U256,
            value: U256,
        ) -> Option<StateLoad<SStoreResult>> {
            let load = self.sload(address, key)?;
            Some(StateLoad::new(
                SStoreResult {
                    original_value: load.data,
                    present_value: load.data,
                    new_value: value,
                },
                load.is_cold,
            ))
        }
        fn tload(&mut self, address: Address, key: U256) -> U256 {
            self.inner.tload(address, key)
        }
        fn tstore(&mut self, address: Address, key: U256, value: U256) {
            self.inner.tstore(address, key, value)
        }
        fn log(&mut self, log: primitives::Log) {
            self.inner.log(log)
        }
        fn selfdestruct(
            &mut self,
            address: Address,
            target: Address,
        ) -> Option<StateLoad<state::SelfDestructResult>> {
            self.inner.selfdestruct(address, target)
        }
        fn block_hash(&mut self, number: u64) -> Option<primitives::B256> {
            self.inner.block_hash(number)
        }
    }

    fn run_cold(code: &[u8], gas_limit: u64) -> (Interpreter, InterpreterResult) {
        let stream = Arc::new(
            analyze(
                Bytes::copy_from_slice(code),
                &AnalysisConfig::new(SpecId::CANCUN),
            )
            .unwrap(),
        );
        let mut interp = Interpreter::new(
            stream,
            InputsImpl::default(),
            false,
            SpecId::CANCUN,
            gas_limit,
        );
        let mut memory = SharedMemory::new();
        let table = instruction_table::<ColdHost>();
        let mut host = ColdHost::default();
        let action = interp.run(&mut memory, &table, &mut host);
        let InterpreterAction::Return(result) = action else {
            panic!("expected return");
        };
        (interp, result)
    }

    #[test]
    fn balance_pays_cold_surcharge_once() {
        // BALANCE(0) twice; the address is cold only the first time.
        let code = [0x60, 0x00, 0x31, 0x50, 0x60, 0x00, 0x31, 0x50, 0x00];
        let (interp, result) = run_cold(&code, 50_000);
        assert_eq!(result.result, InstructionResult::Stop);
        // Static: 2 * (3 + 100 + 2); dynamic: one cold 2500.
        assert_eq!(interp.gas.spent(), 2 * 105 + 2500);
    }

    #[test]
    fn sload_pays_cold_surcharge_once() {
        // SLOAD(7) twice.
        let code = [0x60, 0x07, 0x54, 0x50, 0x60, 0x07, 0x54, 0x50, 0x00];
        let (interp, result) = run_cold(&code, 50_000);
        assert_eq!(result.result, InstructionResult::Stop);
        // Static: 2 * (3 + 100 + 2); dynamic: one cold 2000.
        assert_eq!(interp.gas.spent(), 2 * 105 + 2000);
    }

    #[test]
    fn sstore_rejects_below_the_stipend_sentry() {
        // SSTORE(0, 1) with barely enough gas for the block but inside the
        // EIP-1706 sentry.
        let code = [0x60, 0x01, 0x60, 0x00, 0x55, 0x00];
        let (_, result) = run_cold(&code, 2300);
        assert_eq!(result.result, InstructionResult::OutOfGas);
        assert_eq!(result.gas.remaining(), 0);
    }

    #[test]
    fn static_context_rejects_writes() {
        let stream = Arc::new(
            analyze(
                Bytes::copy_from_slice(&[0x60, 0x01, 0x60, 0x00, 0x55, 0x00]),
                &AnalysisConfig::new(SpecId::CANCUN),
            )
            .unwrap(),
        );
        let mut interp = Interpreter::new(
            stream,
            InputsImpl::default(),
            true,
            SpecId::CANCUN,
            50_000,
        );
        let mut memory = SharedMemory::new();
        let table = instruction_table::<DummyHost>();
        let mut host = DummyHost::default();
        let InterpreterAction::Return(result) = interp.run(&mut memory, &table, &mut host)
        else {
            panic!("expected return");
        };
        assert_eq!(
            result.result,
            InstructionResult::StateChangeDuringStaticCall
        );
    }

    #[test]
    fn log_consumes_topics_and_data() {
        let interp = testing::run_block(&[
            0x60, 0x21, 0x60, 0x00, 0x53, // MSTORE8(0, 0x21)
            0x60, 0x05, 0x60, 0x09, // topics 5, 9
            0x60, 0x01, 0x60, 0x00, // len 1, offset 0
            0xa2, 0x00, // LOG2, STOP
        ]);
        assert!(interp.stack.is_empty());
    }
}
