//! End-to-end execution scenarios.

use irevm::interpreter::InstructionResult;
use irevm::precompile;
use irevm::primitives::{address, hex, keccak256, Address, Bytes, Env, B256, U256};
use irevm::state::{AccountInfo, BackendError, EmptyBackend, StateBackend};
use irevm::{CallParams, CreateParams, Evm};

const CALLER: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
const CONTRACT: Address = address!("1000000000000000000000000000000000000001");
const OTHER: Address = address!("2000000000000000000000000000000000000002");

fn evm() -> Evm<EmptyBackend> {
    let mut evm = Evm::new(Env::default(), EmptyBackend);
    evm.journal().insert_account(
        CALLER,
        AccountInfo::from_balance(U256::from(10).pow(U256::from(18))),
    );
    evm
}

fn deploy<B: StateBackend>(evm: &mut Evm<B>, address: Address, code: &[u8]) {
    let code = Bytes::copy_from_slice(code);
    evm.journal().insert_account(
        address,
        AccountInfo {
            code_hash: keccak256(&code),
            code: Some(code),
            ..Default::default()
        },
    );
}

fn call(evm: &mut Evm<EmptyBackend>, target: Address, gas_limit: u64) -> irevm::ExecutionResult {
    call_with_input(evm, target, gas_limit, Bytes::new())
}

fn call_with_input(
    evm: &mut Evm<EmptyBackend>,
    target: Address,
    gas_limit: u64,
    input: Bytes,
) -> irevm::ExecutionResult {
    evm.execute_call(CallParams {
        caller: CALLER,
        target,
        gas_limit,
        input,
        ..Default::default()
    })
    .expect("backend cannot fail")
}

fn slot<B: StateBackend>(evm: &mut Evm<B>, address: Address, key: u64) -> U256 {
    evm.journal().storage_value(address, U256::from(key))
}

// Scenario: arithmetic and STOP.
#[test]
fn arithmetic_and_stop() {
    let mut evm = evm();
    deploy(&mut evm, CONTRACT, &hex!("6005600a0100"));
    let result = call(&mut evm, CONTRACT, 100);
    assert!(result.success);
    assert_eq!(result.reason, InstructionResult::Stop);
    assert!(result.output.is_empty());
    // PUSH1 + PUSH1 + ADD, 3 gas each.
    assert_eq!(result.gas_used, 9);
    assert_eq!(result.gas_refunded, 0);
}

// Scenario: taken conditional jump with an SSTORE on the jump target.
#[test]
fn conditional_jump_stores() {
    let mut evm = evm();
    // PUSH1 1, PUSH1 8, JUMPI, STOP x3, JUMPDEST, PUSH1 42, PUSH1 0,
    // SSTORE, STOP
    deploy(
        &mut evm,
        CONTRACT,
        &hex!("60016008570000005b602a600055 00"),
    );
    let result = call(&mut evm, CONTRACT, 30_000);
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(42));
}

// Scenario: jump to a non-JUMPDEST target. The target is statically known
// here, so the analyzer rejects the code and the frame never begins; the
// caller still observes an InvalidJump fault consuming all gas.
#[test]
fn invalid_jump_consumes_all_gas() {
    let mut evm = evm();
    deploy(&mut evm, CONTRACT, &hex!("6003560000"));
    let result = call(&mut evm, CONTRACT, 10_000);
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::InvalidJump);
    assert_eq!(result.gas_used, 10_000);
    assert!(result.logs.is_empty());
}

// Same fault taken through the dynamic path: the target is computed, so
// the analyzer cannot reject it.
#[test]
fn invalid_dynamic_jump_consumes_all_gas() {
    let mut evm = evm();
    // PUSH1 2, PUSH1 1, ADD, JUMP: target 3 is inside the code but not a
    // JUMPDEST.
    deploy(&mut evm, CONTRACT, &hex!("6002600101560000"));
    let result = call(&mut evm, CONTRACT, 10_000);
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::InvalidJump);
    assert_eq!(result.gas_used, 10_000);
}

// Scenario: a reverting callee leaves no trace; the caller's own writes
// survive and the CALL pushes 0.
#[test]
fn child_revert_preserves_caller_state() {
    let mut evm = evm();
    // Callee: SSTORE(0, 2); MSTORE8(0, 0x42); REVERT(0, 1)
    deploy(&mut evm, OTHER, &hex!("600260005560426000536001 6000 fd"));
    // Caller: SSTORE(0, 1); CALL(0xffff, OTHER, 0, 0, 0, 0, 0);
    // SSTORE(1, call_result); SSTORE(2, RETURNDATASIZE); STOP
    let mut code = hex!("6001600055").to_vec();
    code.extend_from_slice(&hex!("6000600060006000600073"));
    code.extend_from_slice(OTHER.as_slice());
    code.extend_from_slice(&hex!("61ffff f1"));
    code.extend_from_slice(&hex!("600155"));
    code.extend_from_slice(&hex!("3d600255"));
    code.push(0x00);
    deploy(&mut evm, CONTRACT, &code);

    let result = call(&mut evm, CONTRACT, 200_000);
    assert!(result.success);
    // Caller's write survives; callee's write reverted.
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(1));
    assert_eq!(slot(&mut evm, OTHER, 0), U256::ZERO);
    // The CALL pushed 0, and the revert payload is one byte long.
    assert_eq!(slot(&mut evm, CONTRACT, 1), U256::ZERO);
    assert_eq!(slot(&mut evm, CONTRACT, 2), U256::from(1));
}

// A top-level revert preserves remaining gas and carries its payload.
#[test]
fn top_level_revert() {
    let mut evm = evm();
    // MSTORE8(0, 0x42); REVERT(0, 1)
    deploy(&mut evm, CONTRACT, &hex!("604260005360016000fd"));
    let result = call(&mut evm, CONTRACT, 10_000);
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::Revert);
    assert_eq!(result.revert_reason, Some(Bytes::from_static(&[0x42])));
    assert!(result.gas_used < 10_000);
    assert!(result.logs.is_empty());
}

// Scenario: CREATE2 address determinism and same-transaction collision.
#[test]
fn create2_determinism_and_collision() {
    let mut evm = evm();
    // MSTORE8(0, 0); then twice CREATE2(value=0, offset=0, len=1, salt=1),
    // storing the results at slots 0 and 1.
    deploy(
        &mut evm,
        CONTRACT,
        &hex!("60006000 53 6001600160006000 f5 600055 6001600160006000 f5 600155 00"),
    );
    let result = call(&mut evm, CONTRACT, 500_000);
    assert!(result.success);

    let init_code_hash = keccak256([0x00]);
    let expected = CONTRACT.create2(B256::with_last_byte(1), init_code_hash);
    assert_eq!(
        slot(&mut evm, CONTRACT, 0),
        U256::from_be_bytes::<32>(expected.into_word().0)
    );
    // The second identical CREATE2 collides and pushes 0, but the frame
    // keeps running: slot 1 was still written.
    assert_eq!(slot(&mut evm, CONTRACT, 1), U256::ZERO);
    // The created account exists with the creation nonce.
    assert_eq!(evm.journal().account(expected).unwrap().info.nonce, 1);
}

// Scenario: Istanbul net metering, writing away from and back to the
// original value.
#[test]
fn sstore_restoration_refund() {
    let mut evm = evm();
    evm.journal()
        .insert_storage(CONTRACT, U256::ZERO, U256::from(10));
    // SSTORE(0, 20); SSTORE(0, 10); STOP
    deploy(&mut evm, CONTRACT, &hex!("6014600055600a60005500"));
    let result = call(&mut evm, CONTRACT, 100_000);
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(10));

    // Static: four pushes. Dynamic: cold reset 5000, then warm 100.
    let spent = 12 + 5000 + 100;
    // Restoring the original refunds 2800, capped at spent / 5.
    let refund = core::cmp::min(2800, spent / 5);
    assert_eq!(result.gas_refunded, refund);
    assert_eq!(result.gas_used, spent - refund);
}

// Fusion is transparent: identical results and gas with and without it.
#[test]
fn fusion_is_observationally_equivalent() {
    let run = |disable_fusion: bool| {
        let mut env = Env::default();
        env.cfg.disable_fusion = disable_fusion;
        let mut evm = Evm::new(env, EmptyBackend);
        deploy(
            &mut evm,
            CONTRACT,
            &hex!("60016008570000005b602a600055 00"),
        );
        let result = call(&mut evm, CONTRACT, 30_000);
        (result, slot(&mut evm, CONTRACT, 0))
    };
    let (fused, fused_slot) = run(false);
    let (plain, plain_slot) = run(true);
    assert_eq!(fused, plain);
    assert_eq!(fused_slot, plain_slot);
}

// Transient storage crosses frames within a transaction and nothing else
// (EIP-1153).
#[test]
fn transient_storage_lifecycle() {
    let mut evm = evm();
    // If calldata is empty: TSTORE(0, 7), then self-call with one byte of
    // calldata. Otherwise: SSTORE(0, TLOAD(0)).
    let code = hex!(
        "36 6018 57
         6007 6000 5d
         6000 6000 6001 6000 6000 30 5a f1 50 00
         5b 6000 5c 6000 55 00"
    );
    deploy(&mut evm, CONTRACT, &code);

    let result = call(&mut evm, CONTRACT, 200_000);
    assert!(result.success);
    // The inner frame observed the outer frame's TSTORE.
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(7));

    // A fresh transaction starts with cleared transient storage.
    let result = call_with_input(&mut evm, CONTRACT, 200_000, Bytes::from_static(&[1]));
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::ZERO);
}

// Boundary: frame 1024 executes, frame 1025 is refused.
#[test]
fn call_depth_limit() {
    let mut evm = evm();
    // SSTORE(0, SLOAD(0) + 1), then recurse into self with all gas.
    let code = hex!("6000 54 6001 01 6000 55 6000 6000 6000 6000 6000 30 5a f1 50 00");
    deploy(&mut evm, CONTRACT, &code);
    let result = call(&mut evm, CONTRACT, 2_000_000_000_000);
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(1024));
}

// Boundary: pushing to exactly 1024 works, 1025 overflows at block entry.
#[test]
fn stack_limit_boundary() {
    let mut evm = evm();
    let mut code = hex!("6001").repeat(1024);
    code.push(0x00);
    deploy(&mut evm, CONTRACT, &code);
    let result = call(&mut evm, CONTRACT, 100_000);
    assert!(result.success);

    let mut code = hex!("6001").repeat(1025);
    code.push(0x00);
    deploy(&mut evm, OTHER, &code);
    let result = call(&mut evm, OTHER, 100_000);
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::StackOverflow);
}

// Boundary: memory can grow to exactly the configured limit and no
// further.
#[test]
fn memory_limit_boundary() {
    let mut evm = evm();
    let limit = evm.ctx.env.cfg.memory_limit as usize;
    // MSTORE(limit - 32, 1): the final word inside the limit.
    let mut code = vec![0x60, 0x01, 0x63];
    code.extend_from_slice(&(((limit - 32) as u32).to_be_bytes()));
    code.extend_from_slice(&[0x52, 0x00]);
    deploy(&mut evm, CONTRACT, &code);
    let result = call(&mut evm, CONTRACT, 1_000_000_000);
    assert!(result.success);

    // MSTORE(limit - 31, 1): one byte past it.
    let mut code = vec![0x60, 0x01, 0x63];
    code.extend_from_slice(&(((limit - 31) as u32).to_be_bytes()));
    code.extend_from_slice(&[0x52, 0x00]);
    deploy(&mut evm, OTHER, &code);
    let result = call(&mut evm, OTHER, 1_000_000_000);
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::MemoryLimitOOG);
}

// Calls into accounts without code succeed immediately.
#[test]
fn call_to_empty_account() {
    let mut evm = evm();
    let result = evm
        .execute_call(CallParams {
            caller: CALLER,
            target: OTHER,
            value: U256::from(1_000),
            gas_limit: 50_000,
            ..Default::default()
        })
        .unwrap();
    assert!(result.success);
    assert_eq!(
        evm.journal().account(OTHER).unwrap().info.balance,
        U256::from(1_000)
    );
}

// Value transfers above the balance fail preserving gas.
#[test]
fn insufficient_balance() {
    let mut evm = evm();
    let result = evm
        .execute_call(CallParams {
            caller: OTHER,
            target: CONTRACT,
            value: U256::from(1),
            gas_limit: 50_000,
            ..Default::default()
        })
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::OutOfFunds);
    assert_eq!(result.gas_used, 0);
}

// Writes inside a STATICCALL fault the callee, not the caller.
#[test]
fn static_context_blocks_writes() {
    let mut evm = evm();
    // Callee stores 1 at slot 0.
    deploy(&mut evm, OTHER, &hex!("600160005500"));
    // Caller: STATICCALL(gas, OTHER, 0, 0, 0, 0); SSTORE(0, result); STOP
    let mut code = hex!("600060006000600073").to_vec();
    code.extend_from_slice(OTHER.as_slice());
    code.extend_from_slice(&hex!("61ffff fa 600055 00"));
    deploy(&mut evm, CONTRACT, &code);

    let result = call(&mut evm, CONTRACT, 200_000);
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::ZERO);
    assert_eq!(slot(&mut evm, OTHER, 0), U256::ZERO);
}

// Top-level CREATE: nonce-derived address, code installation, deposit gas.
#[test]
fn create_installs_code() {
    let mut evm = evm();
    // Init code returning a single STOP byte.
    let init_code = hex!("6001600c60003960016000f300");
    let result = evm
        .execute_create(CreateParams {
            caller: CALLER,
            init_code: Bytes::copy_from_slice(&init_code),
            gas_limit: 100_000,
            ..Default::default()
        })
        .unwrap();
    assert!(result.success);

    let created = CALLER.create(0);
    assert_eq!(result.created_address, Some(created));
    let account = evm.journal().account(created).unwrap().clone();
    assert_eq!(account.info.nonce, 1);
    assert_eq!(account.info.code, Some(Bytes::from_static(&[0x00])));
    assert_eq!(account.info.code_hash, keccak256([0x00]));
    // Caller nonce burned.
    assert_eq!(evm.journal().account(CALLER).unwrap().info.nonce, 1);
}

// The deployed code is callable in a follow-up transaction through the
// analysis cache.
#[test]
fn created_code_is_callable() {
    let mut evm = evm();
    let init_code = hex!("6001600c60003960016000f300");
    let result = evm
        .execute_create(CreateParams {
            caller: CALLER,
            init_code: Bytes::copy_from_slice(&init_code),
            gas_limit: 100_000,
            ..Default::default()
        })
        .unwrap();
    let created = result.created_address.unwrap();
    let result = call(&mut evm, created, 50_000);
    assert!(result.success);
    assert_eq!(result.gas_used, 0);
}

// Precompile dispatch: the identity precompile copies and charges its
// formula, with no bytecode involved.
#[test]
fn identity_precompile_roundtrip() {
    let mut evm = evm();
    let input = Bytes::from_static(b"irevm");
    let result = call_with_input(&mut evm, precompile::IDENTITY, 1_000, input.clone());
    assert!(result.success);
    assert_eq!(result.output, input);
    assert_eq!(result.gas_used, 18);
}

// A pending fork-backend fetch aborts the transaction; once resolved, the
// replay succeeds deterministically.
#[test]
fn pending_backend_retry() {
    use std::cell::Cell;

    #[derive(Debug)]
    struct PendingOnce {
        resolved: Cell<bool>,
    }

    impl StateBackend for PendingOnce {
        fn basic(&self, _address: Address) -> Result<Option<AccountInfo>, BackendError> {
            Ok(None)
        }
        fn code_by_hash(&self, _code_hash: B256) -> Result<Bytes, BackendError> {
            Ok(Bytes::new())
        }
        fn storage(&self, _address: Address, _index: U256) -> Result<U256, BackendError> {
            if self.resolved.get() {
                Ok(U256::from(5))
            } else {
                Err(BackendError::Pending(7))
            }
        }
        fn block_hash(&self, _number: u64) -> Result<B256, BackendError> {
            Ok(B256::ZERO)
        }
    }

    let mut evm = Evm::new(
        Env::default(),
        PendingOnce {
            resolved: Cell::new(false),
        },
    );
    // SSTORE(1, SLOAD(0)); STOP
    deploy(
        &mut evm,
        CONTRACT,
        &hex!("6000546001 55 00"),
    );

    let params = CallParams {
        caller: CALLER,
        target: CONTRACT,
        gas_limit: 100_000,
        ..Default::default()
    };
    let error = evm.execute_call(params.clone()).unwrap_err();
    assert_eq!(error, irevm::EvmError::Pending(7));
    // The aborted transaction left nothing behind.
    assert_eq!(slot(&mut evm, CONTRACT, 1), U256::ZERO);

    evm.journal().backend().resolved.set(true);
    let result = evm.execute_call(params).unwrap();
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 1), U256::from(5));
}

// Logs are collected on success and dropped on failure.
#[test]
fn logs_follow_the_outcome() {
    let mut evm = evm();
    // LOG1(topic=9, mem[0..1]); STOP
    deploy(&mut evm, CONTRACT, &hex!("6009600160 00 a1 00"));
    let result = call(&mut evm, CONTRACT, 50_000);
    assert!(result.success);
    assert_eq!(result.logs.len(), 1);
    assert_eq!(result.logs[0].address, CONTRACT);
    assert_eq!(
        result.logs[0].data.topics(),
        &[B256::from(U256::from(9))]
    );

    // Same log then REVERT: no logs surface.
    deploy(&mut evm, OTHER, &hex!("6009600160 00 a1 60006000fd"));
    let result = call(&mut evm, OTHER, 50_000);
    assert!(!result.success);
    assert!(result.logs.is_empty());
}

// DELEGATECALL runs foreign code against the caller's own storage with the
// original caller and value visible.
#[test]
fn delegatecall_keeps_caller_context() {
    let mut evm = evm();
    // Library: SSTORE(0, CALLVALUE); SSTORE(1, CALLER); STOP
    deploy(&mut evm, OTHER, &hex!("3460005533600155 00"));
    // Caller: DELEGATECALL(gas, OTHER, 0, 0, 0, 0); POP; STOP
    let mut code = hex!("60006000600060 00 73").to_vec();
    code.extend_from_slice(OTHER.as_slice());
    code.extend_from_slice(&hex!("61ffff f4 50 00"));
    deploy(&mut evm, CONTRACT, &code);

    let result = evm
        .execute_call(CallParams {
            caller: CALLER,
            target: CONTRACT,
            value: U256::from(99),
            gas_limit: 200_000,
            ..Default::default()
        })
        .unwrap();
    assert!(result.success);
    // The library wrote into the caller's storage, not its own.
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(99));
    assert_eq!(
        slot(&mut evm, CONTRACT, 1),
        U256::from_be_bytes::<32>(CALLER.into_word().0)
    );
    assert_eq!(slot(&mut evm, OTHER, 0), U256::ZERO);
}

// CALLCODE also borrows code, but the callee sees the borrower as caller
// and the value is checked against the borrower's own balance.
#[test]
fn callcode_borrows_code_only() {
    let mut evm = evm();
    deploy(&mut evm, OTHER, &hex!("3460005533600155 00"));
    let mut code = hex!("60006000600060 00 6005 73").to_vec();
    code.extend_from_slice(OTHER.as_slice());
    code.extend_from_slice(&hex!("61ffff f2 50 00"));
    let code_bytes = Bytes::from(code);
    evm.journal().insert_account(
        CONTRACT,
        AccountInfo {
            balance: U256::from(7),
            code_hash: keccak256(&code_bytes),
            code: Some(code_bytes),
            ..Default::default()
        },
    );

    let result = call(&mut evm, CONTRACT, 200_000);
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(5));
    assert_eq!(
        slot(&mut evm, CONTRACT, 1),
        U256::from_be_bytes::<32>(CONTRACT.into_word().0)
    );
    // The self-transfer left the balance alone.
    assert_eq!(
        evm.journal().account(CONTRACT).unwrap().info.balance,
        U256::from(7)
    );
}

// Post-Cancun, destroying a pre-existing account moves its balance but the
// account survives (EIP-6780).
#[test]
fn selfdestruct_of_preexisting_account() {
    let mut evm = evm();
    let mut code = hex!("73").to_vec();
    code.extend_from_slice(OTHER.as_slice());
    code.push(0xff);
    let code_bytes = Bytes::from(code);
    evm.journal().insert_account(
        CONTRACT,
        AccountInfo {
            balance: U256::from(10),
            code_hash: keccak256(&code_bytes),
            code: Some(code_bytes),
            ..Default::default()
        },
    );

    let result = call(&mut evm, CONTRACT, 50_000);
    assert!(result.success);
    assert_eq!(result.reason, InstructionResult::SelfDestruct);
    assert!(evm.journal().account(CONTRACT).is_some());
    assert_eq!(
        evm.journal().account(CONTRACT).unwrap().info.balance,
        U256::ZERO
    );
    assert_eq!(
        evm.journal().account(OTHER).unwrap().info.balance,
        U256::from(10)
    );
}

// The snapshot API rolls whole transactions back.
#[test]
fn snapshot_api_spans_transactions() {
    let mut evm = evm();
    evm.journal()
        .insert_storage(CONTRACT, U256::ZERO, U256::from(5));
    deploy(&mut evm, CONTRACT, &hex!("602a60005500"));

    let id = evm.snapshot();
    let result = call(&mut evm, CONTRACT, 100_000);
    assert!(result.success);
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(42));

    evm.revert_to_snapshot(id).unwrap();
    assert_eq!(slot(&mut evm, CONTRACT, 0), U256::from(5));
    assert!(evm.revert_to_snapshot(id).is_err());
}

// EIP-2929: the first BALANCE of an address pays the cold surcharge, the
// second runs at the warm base already charged at block entry.
#[test]
fn cold_then_warm_account_access() {
    let mut evm = evm();
    let stranger = address!("3000000000000000000000000000000000000003");
    let mut code = vec![0x73];
    code.extend_from_slice(stranger.as_slice());
    code.push(0x31);
    code.push(0x50);
    code.push(0x73);
    code.extend_from_slice(stranger.as_slice());
    code.push(0x31);
    code.push(0x50);
    code.push(0x00);
    deploy(&mut evm, CONTRACT, &code);

    let result = call(&mut evm, CONTRACT, 50_000);
    assert!(result.success);
    // Static per access: PUSH20 3 + BALANCE 100 + POP 2; one cold 2500.
    assert_eq!(result.gas_used, 2 * 105 + 2500);
}

// Sequential CREATEs derive distinct nonce-based addresses.
#[test]
fn create_addresses_follow_the_nonce() {
    let mut evm = evm();
    let init_code = Bytes::from_static(&hex!("6001600c60003960016000f300"));
    let first = evm
        .execute_create(CreateParams {
            caller: CALLER,
            init_code: init_code.clone(),
            gas_limit: 100_000,
            ..Default::default()
        })
        .unwrap();
    let second = evm
        .execute_create(CreateParams {
            caller: CALLER,
            init_code,
            gas_limit: 100_000,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(first.created_address, Some(CALLER.create(0)));
    assert_eq!(second.created_address, Some(CALLER.create(1)));
    assert_ne!(first.created_address, second.created_address);
}

// BLOCKHASH answers inside the 256-block window and zero elsewhere.
#[test]
fn blockhash_window() {
    let mut env = Env::default();
    env.block.number = 300;
    let mut evm = Evm::new(env, EmptyBackend);
    // slots 0..2 = BLOCKHASH(299), BLOCKHASH(300), BLOCKHASH(43)
    deploy(
        &mut evm,
        CONTRACT,
        &hex!("61012b40600055 61012c40600155 602b40600255 00"),
    );
    let result = call(&mut evm, CONTRACT, 100_000);
    assert!(result.success);
    assert_ne!(slot(&mut evm, CONTRACT, 0), U256::ZERO);
    assert_eq!(slot(&mut evm, CONTRACT, 1), U256::ZERO);
    assert_eq!(slot(&mut evm, CONTRACT, 2), U256::ZERO);
}

// EIP-211: RETURNDATACOPY past the end of the buffer is a fault, not a
// zero-fill.
#[test]
fn returndatacopy_out_of_bounds() {
    let mut evm = evm();
    // CALL an empty account, then RETURNDATACOPY(0, 0, 1).
    let mut code = hex!("600060006000600060 00 73").to_vec();
    code.extend_from_slice(OTHER.as_slice());
    code.extend_from_slice(&hex!("61ffff f1 50 6001 6000 6000 3e 00"));
    deploy(&mut evm, CONTRACT, &code);
    let result = call(&mut evm, CONTRACT, 200_000);
    assert!(!result.success);
    assert_eq!(result.reason, InstructionResult::OutOfOffset);
}

// The refund counter never exceeds a fifth of the spent gas.
#[test]
fn refund_cap_on_storage_clear() {
    let mut evm = evm();
    evm.journal()
        .insert_storage(CONTRACT, U256::ZERO, U256::from(5));
    // SSTORE(0, 0); STOP
    deploy(&mut evm, CONTRACT, &hex!("6000600055 00"));
    let result = call(&mut evm, CONTRACT, 100_000);
    assert!(result.success);
    // Static 6 + cold reset 5000; clearing refunds 4800, capped to a fifth.
    let spent = 6 + 5000;
    assert_eq!(result.gas_refunded, spent / 5);
    assert_eq!(result.gas_used, spent - spent / 5);
}

// A debugging harness can freeze the machine between any two handlers and
// observe the stack.
#[test]
fn single_stepping_observes_the_stack() {
    use irevm::bytecode::{analyze, AnalysisConfig};
    use irevm::interpreter::{
        instruction_table, DummyHost, InputsImpl, Interpreter, SharedMemory,
    };
    use irevm::primitives::SpecId;
    use std::sync::Arc;

    let stream = Arc::new(
        analyze(
            Bytes::from_static(&hex!("6005600a0100")),
            &AnalysisConfig::new(SpecId::CANCUN),
        )
        .unwrap(),
    );
    let mut interp = Interpreter::new(stream, InputsImpl::default(), false, SpecId::CANCUN, 100);
    let mut memory = SharedMemory::new();
    let table = instruction_table::<DummyHost>();
    let mut host = DummyHost::default();

    let mut steps = 0;
    while interp.action.is_none() {
        interp.step(&mut memory, &table, &mut host);
        steps += 1;
        assert!(steps < 100, "runaway execution");
    }
    // The machine halted on STOP with 5 + 10 on top of the stack.
    assert_eq!(interp.stack.data(), &[U256::from(15)]);
    assert_eq!(interp.gas.spent(), 9);
}
