//! The handler table: one entry per opcode value plus the synthetic slots.

use crate::{
    host::Host,
    instructions::{
        arithmetic, bitwise, block_info, contract, control, fused, host as host_ops, memory,
        stack, system, tx_info,
    },
    interpreter::InstructionContext,
};
use bytecode::opcode::{self, synthetic};

/// An instruction handler.
pub type Instruction<H> = fn(InstructionContext<'_, H>);

/// Dispatch table over real opcodes and synthetic stream slots.
pub type InstructionTable<H> = [Instruction<H>; synthetic::TABLE_LEN];

/// Builds the handler table. Undefined opcode values keep the `unknown`
/// handler; the analyzer rejects them before execution ever gets here.
pub fn instruction_table<H: Host + ?Sized>() -> InstructionTable<H> {
    let mut table: InstructionTable<H> =
        [control::unknown as Instruction<H>; synthetic::TABLE_LEN];

    table[opcode::STOP as usize] = control::stop;
    table[opcode::ADD as usize] = arithmetic::add;
    table[opcode::MUL as usize] = arithmetic::mul;
    table[opcode::SUB as usize] = arithmetic::sub;
    table[opcode::DIV as usize] = arithmetic::div;
    table[opcode::SDIV as usize] = arithmetic::sdiv;
    table[opcode::MOD as usize] = arithmetic::rem;
    table[opcode::SMOD as usize] = arithmetic::smod;
    table[opcode::ADDMOD as usize] = arithmetic::addmod;
    table[opcode::MULMOD as usize] = arithmetic::mulmod;
    table[opcode::EXP as usize] = arithmetic::exp;
    table[opcode::SIGNEXTEND as usize] = arithmetic::signextend;

    table[opcode::LT as usize] = bitwise::lt;
    table[opcode::GT as usize] = bitwise::gt;
    table[opcode::SLT as usize] = bitwise::slt;
    table[opcode::SGT as usize] = bitwise::sgt;
    table[opcode::EQ as usize] = bitwise::eq;
    table[opcode::ISZERO as usize] = bitwise::iszero;
    table[opcode::AND as usize] = bitwise::bitand;
    table[opcode::OR as usize] = bitwise::bitor;
    table[opcode::XOR as usize] = bitwise::bitxor;
    table[opcode::NOT as usize] = bitwise::not;
    table[opcode::BYTE as usize] = bitwise::byte;
    table[opcode::SHL as usize] = bitwise::shl;
    table[opcode::SHR as usize] = bitwise::shr;
    table[opcode::SAR as usize] = bitwise::sar;

    table[opcode::KECCAK256 as usize] = system::keccak256_op;

    table[opcode::ADDRESS as usize] = system::address;
    table[opcode::BALANCE as usize] = host_ops::balance;
    table[opcode::ORIGIN as usize] = tx_info::origin;
    table[opcode::CALLER as usize] = system::caller;
    table[opcode::CALLVALUE as usize] = system::callvalue;
    table[opcode::CALLDATALOAD as usize] = system::calldataload;
    table[opcode::CALLDATASIZE as usize] = system::calldatasize;
    table[opcode::CALLDATACOPY as usize] = system::calldatacopy;
    table[opcode::CODESIZE as usize] = system::codesize;
    table[opcode::CODECOPY as usize] = system::codecopy;
    table[opcode::GASPRICE as usize] = tx_info::gasprice;
    table[opcode::EXTCODESIZE as usize] = host_ops::extcodesize;
    table[opcode::EXTCODECOPY as usize] = host_ops::extcodecopy;
    table[opcode::RETURNDATASIZE as usize] = system::returndatasize;
    table[opcode::RETURNDATACOPY as usize] = system::returndatacopy;
    table[opcode::EXTCODEHASH as usize] = host_ops::extcodehash;

    table[opcode::BLOCKHASH as usize] = host_ops::blockhash;
    table[opcode::COINBASE as usize] = block_info::coinbase;
    table[opcode::TIMESTAMP as usize] = block_info::timestamp;
    table[opcode::NUMBER as usize] = block_info::block_number;
    table[opcode::DIFFICULTY as usize] = block_info::difficulty;
    table[opcode::GASLIMIT as usize] = block_info::gaslimit;
    table[opcode::CHAINID as usize] = block_info::chainid;
    table[opcode::SELFBALANCE as usize] = host_ops::selfbalance;
    table[opcode::BASEFEE as usize] = block_info::basefee;
    table[opcode::BLOBHASH as usize] = tx_info::blob_hash;
    table[opcode::BLOBBASEFEE as usize] = block_info::blob_basefee;

    table[opcode::POP as usize] = stack::pop;
    table[opcode::MLOAD as usize] = memory::mload;
    table[opcode::MSTORE as usize] = memory::mstore;
    table[opcode::MSTORE8 as usize] = memory::mstore8;
    table[opcode::SLOAD as usize] = host_ops::sload;
    table[opcode::SSTORE as usize] = host_ops::sstore;
    table[opcode::JUMP as usize] = control::jump;
    table[opcode::JUMPI as usize] = control::jumpi;
    table[opcode::PC as usize] = control::pc;
    table[opcode::MSIZE as usize] = memory::msize;
    table[opcode::GAS as usize] = system::gas;
    table[opcode::JUMPDEST as usize] = control::begin_block;
    table[opcode::TLOAD as usize] = host_ops::tload;
    table[opcode::TSTORE as usize] = host_ops::tstore;
    table[opcode::MCOPY as usize] = memory::mcopy;
    table[opcode::PUSH0 as usize] = stack::push0;

    for op in opcode::PUSH1..=opcode::PUSH32 {
        table[op as usize] = stack::push_inline;
    }

    table[opcode::DUP1 as usize] = stack::dup::<1, H>;
    table[opcode::DUP2 as usize] = stack::dup::<2, H>;
    table[opcode::DUP3 as usize] = stack::dup::<3, H>;
    table[opcode::DUP4 as usize] = stack::dup::<4, H>;
    table[opcode::DUP5 as usize] = stack::dup::<5, H>;
    table[opcode::DUP6 as usize] = stack::dup::<6, H>;
    table[opcode::DUP7 as usize] = stack::dup::<7, H>;
    table[opcode::DUP8 as usize] = stack::dup::<8, H>;
    table[opcode::DUP9 as usize] = stack::dup::<9, H>;
    table[opcode::DUP10 as usize] = stack::dup::<10, H>;
    table[opcode::DUP11 as usize] = stack::dup::<11, H>;
    table[opcode::DUP12 as usize] = stack::dup::<12, H>;
    table[opcode::DUP13 as usize] = stack::dup::<13, H>;
    table[opcode::DUP14 as usize] = stack::dup::<14, H>;
    table[opcode::DUP15 as usize] = stack::dup::<15, H>;
    table[opcode::DUP16 as usize] = stack::dup::<16, H>;

    table[opcode::SWAP1 as usize] = stack::swap::<1, H>;
    table[opcode::SWAP2 as usize] = stack::swap::<2, H>;
    table[opcode::SWAP3 as usize] = stack::swap::<3, H>;
    table[opcode::SWAP4 as usize] = stack::swap::<4, H>;
    table[opcode::SWAP5 as usize] = stack::swap::<5, H>;
    table[opcode::SWAP6 as usize] = stack::swap::<6, H>;
    table[opcode::SWAP7 as usize] = stack::swap::<7, H>;
    table[opcode::SWAP8 as usize] = stack::swap::<8, H>;
    table[opcode::SWAP9 as usize] = stack::swap::<9, H>;
    table[opcode::SWAP10 as usize] = stack::swap::<10, H>;
    table[opcode::SWAP11 as usize] = stack::swap::<11, H>;
    table[opcode::SWAP12 as usize] = stack::swap::<12, H>;
    table[opcode::SWAP13 as usize] = stack::swap::<13, H>;
    table[opcode::SWAP14 as usize] = stack::swap::<14, H>;
    table[opcode::SWAP15 as usize] = stack::swap::<15, H>;
    table[opcode::SWAP16 as usize] = stack::swap::<16, H>;

    table[opcode::LOG0 as usize] = host_ops::log::<0, H>;
    table[opcode::LOG1 as usize] = host_ops::log::<1, H>;
    table[opcode::LOG2 as usize] = host_ops::log::<2, H>;
    table[opcode::LOG3 as usize] = host_ops::log::<3, H>;
    table[opcode::LOG4 as usize] = host_ops::log::<4, H>;

    table[opcode::CREATE as usize] = contract::create::<false, H>;
    table[opcode::CALL as usize] = contract::call;
    table[opcode::CALLCODE as usize] = contract::call_code;
    table[opcode::RETURN as usize] = control::ret;
    table[opcode::DELEGATECALL as usize] = contract::delegate_call;
    table[opcode::CREATE2 as usize] = contract::create::<true, H>;
    table[opcode::STATICCALL as usize] = contract::static_call;
    table[opcode::REVERT as usize] = control::revert;
    table[opcode::INVALID as usize] = control::invalid;
    table[opcode::SELFDESTRUCT as usize] = host_ops::selfdestruct;

    table[synthetic::BEGINBLOCK as usize] = control::begin_block;
    table[synthetic::PUSH_CONST as usize] = stack::push_const;
    table[synthetic::PUSH_ADD as usize] = fused::push_add;
    table[synthetic::PUSH_MUL as usize] = fused::push_mul;
    table[synthetic::PUSH_SUB as usize] = fused::push_sub;
    table[synthetic::PUSH_DIV as usize] = fused::push_div;
    table[synthetic::PUSH_AND as usize] = fused::push_and;
    table[synthetic::PUSH_OR as usize] = fused::push_or;
    table[synthetic::PUSH_XOR as usize] = fused::push_xor;
    table[synthetic::PUSH_JUMP as usize] = fused::push_jump;
    table[synthetic::PUSH_JUMPI as usize] = fused::push_jumpi;

    table
}
