//! One-shot translation of raw bytecode into an [`InstructionStream`].
//!
//! Analysis walks the code twice. The first scan validates structure and
//! collects the set of valid `JUMPDEST` positions (bytes inside PUSH
//! immediates excluded). The second scan emits handler/metadata slots,
//! accumulates per-basic-block gas and stack requirements, applies peephole
//! fusion, and statically validates jumps whose target is pushed directly in
//! front of them.

use crate::{
    error::AnalysisError,
    opcode::{self, synthetic, OpInfo},
    stream::{BlockInfo, InstructionStream, JumpTable},
};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use primitives::{keccak256, Bytes, SpecId, MAX_CODE_SIZE, MAX_INITCODE_SIZE, U256};

/// Whether the code is deployed contract code or init code. The two differ
/// only in their size limit and the error they raise when over it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnalysisKind {
    #[default]
    Deployed,
    Initcode,
}

/// Analyzer configuration.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisConfig {
    /// Hardfork the code will execute under. Determines opcode availability
    /// and static gas.
    pub spec: SpecId,
    /// Emit fused slots for common PUSH+op pairs. Semantics are identical
    /// either way.
    pub enable_fusion: bool,
    /// Deployed code or init code.
    pub kind: AnalysisKind,
    /// Size limit for the code.
    pub max_size: usize,
}

impl AnalysisConfig {
    /// Configuration for deployed contract code.
    pub fn new(spec: SpecId) -> Self {
        Self {
            spec,
            enable_fusion: true,
            kind: AnalysisKind::Deployed,
            max_size: MAX_CODE_SIZE,
        }
    }

    /// Configuration for CREATE/CREATE2 init code.
    pub fn initcode(spec: SpecId) -> Self {
        Self {
            spec,
            enable_fusion: true,
            kind: AnalysisKind::Initcode,
            max_size: MAX_INITCODE_SIZE,
        }
    }

    /// Disables fusion.
    pub fn without_fusion(mut self) -> Self {
        self.enable_fusion = false;
        self
    }
}

/// Ops that observe or forward the remaining gas. Each gets a basic block of
/// its own so the gas they see is exact, not rounded up to its block start.
const fn observes_gas(op: u8) -> bool {
    matches!(
        op,
        opcode::GAS
            | opcode::CALL
            | opcode::CALLCODE
            | opcode::DELEGATECALL
            | opcode::STATICCALL
            | opcode::CREATE
            | opcode::CREATE2
            | opcode::SELFDESTRUCT
    )
}

/// Running accumulator for the block currently being emitted.
#[derive(Default)]
struct BlockAcc {
    gas: u64,
    req: i32,
    change: i32,
    max_growth: i32,
}

impl BlockAcc {
    fn account(&mut self, info: &OpInfo, gas: u64) {
        self.gas += gas;
        let inputs = info.inputs() as i32;
        let outputs = info.outputs() as i32;
        if inputs - self.change > self.req {
            self.req = inputs - self.change;
        }
        self.change += outputs - inputs;
        if self.change > self.max_growth {
            self.max_growth = self.change;
        }
    }

    fn finish(&self) -> BlockInfo {
        BlockInfo {
            gas_cost: self.gas.min(u32::MAX as u64) as u32,
            stack_req: self.req.clamp(0, u16::MAX as i32) as u16,
            stack_max_growth: self.max_growth.clamp(0, u16::MAX as i32) as u16,
        }
    }
}

struct Emitter {
    spec: SpecId,
    slots: Vec<u64>,
    constants: Vec<U256>,
    blocks: Vec<BlockInfo>,
    jump_pairs: Vec<(u32, u32)>,
    /// `(metadata slot, target pc)` of fused jumps resolved once all
    /// destinations are known.
    fixups: Vec<(usize, u32)>,
    current: Option<(usize, BlockAcc)>,
}

impl Emitter {
    fn new(spec: SpecId) -> Self {
        Self {
            spec,
            slots: Vec::new(),
            constants: Vec::new(),
            blocks: Vec::new(),
            jump_pairs: Vec::new(),
            fixups: Vec::new(),
            current: None,
        }
    }

    /// Opens a new block, emitting a `BEGINBLOCK` slot unless the caller is
    /// about to emit a `JUMPDEST`, which doubles as the block header.
    fn open_block(&mut self, header: Option<u8>) {
        self.close_block();
        self.blocks.push(BlockInfo::default());
        let idx = self.blocks.len() - 1;
        match header {
            Some(op) => self.slots.push(op as u64),
            None => self.slots.push(synthetic::BEGINBLOCK as u64),
        }
        self.slots.push(idx as u64);
        self.current = Some((idx, BlockAcc::default()));
    }

    fn close_block(&mut self) {
        if let Some((idx, acc)) = self.current.take() {
            self.blocks[idx] = acc.finish();
        }
    }

    fn ensure_block(&mut self) {
        if self.current.is_none() {
            self.open_block(None);
        }
    }

    fn account(&mut self, op: u8) {
        let info = opcode::info(op).expect("validated opcode");
        let gas = opcode::static_gas(op, self.spec);
        self.current
            .as_mut()
            .expect("block is open")
            .1
            .account(&info, gas);
    }
}

/// Analyzes `code`, producing an instruction stream ready for execution, or
/// the first structural error encountered.
pub fn analyze(code: Bytes, config: &AnalysisConfig) -> Result<InstructionStream, AnalysisError> {
    if code.len() > config.max_size {
        return Err(match config.kind {
            AnalysisKind::Deployed => AnalysisError::CodeSizeLimit {
                len: code.len(),
                limit: config.max_size,
            },
            AnalysisKind::Initcode => AnalysisError::InitcodeSizeLimit {
                len: code.len(),
                limit: config.max_size,
            },
        });
    }

    let spec = config.spec;
    let jumpdests = validate(&code, spec)?;
    let mut e = Emitter::new(spec);

    // Whether execution can run past the last emitted instruction. True for
    // conditional jumps and the gas-observing ops that close their block
    // but still fall through; running off the end stops implicitly.
    let mut falls_through = true;

    let mut i = 0;
    while i < code.len() {
        let op = code[i];
        let info = opcode::info(op).expect("validated opcode");

        if op == opcode::JUMPDEST {
            e.open_block(Some(opcode::JUMPDEST));
            e.jump_pairs
                .push((i as u32, (e.slots.len() - 2) as u32));
            e.account(opcode::JUMPDEST);
            falls_through = true;
            i += 1;
            continue;
        }

        // Gas-observing ops start a fresh block so the remaining gas they
        // see is exact.
        if observes_gas(op) && e.current.is_some() {
            e.close_block();
        }
        e.ensure_block();

        let imm = info.immediate_size() as usize;
        if imm > 0 {
            // PUSH1..PUSH32
            let value = U256::try_from_be_slice(&code[i + 1..i + 1 + imm])
                .expect("immediate is at most 32 bytes");
            let next_pc = i + 1 + imm;
            let next_op = if next_pc < code.len() {
                Some(code[next_pc])
            } else {
                None
            };

            // Statically-known jump targets are validated at analysis time,
            // fused or not.
            if matches!(next_op, Some(opcode::JUMP) | Some(opcode::JUMPI)) {
                let target = usize::try_from(value).unwrap_or(usize::MAX);
                if !jumpdests.get(target).map(|b| *b).unwrap_or(false) {
                    return Err(AnalysisError::InvalidJumpDestination {
                        pc: next_pc,
                        target,
                    });
                }
            }

            let inline = u64::try_from(value).ok();
            let fused = if config.enable_fusion {
                match (next_op, inline) {
                    (Some(opcode::ADD), Some(v)) => Some((synthetic::PUSH_ADD, v, false)),
                    (Some(opcode::MUL), Some(v)) => Some((synthetic::PUSH_MUL, v, false)),
                    (Some(opcode::SUB), Some(v)) => Some((synthetic::PUSH_SUB, v, false)),
                    (Some(opcode::DIV), Some(v)) => Some((synthetic::PUSH_DIV, v, false)),
                    (Some(opcode::AND), Some(v)) => Some((synthetic::PUSH_AND, v, false)),
                    (Some(opcode::OR), Some(v)) => Some((synthetic::PUSH_OR, v, false)),
                    (Some(opcode::XOR), Some(v)) => Some((synthetic::PUSH_XOR, v, false)),
                    (Some(opcode::JUMP), Some(v)) => Some((synthetic::PUSH_JUMP, v, true)),
                    (Some(opcode::JUMPI), Some(v)) => Some((synthetic::PUSH_JUMPI, v, true)),
                    _ => None,
                }
            } else {
                None
            };

            if let Some((fused_op, value, is_jump)) = fused {
                let second = next_op.expect("fused pair has a second opcode");
                e.slots.push(fused_op as u64);
                if is_jump {
                    e.fixups.push((e.slots.len(), value as u32));
                    e.slots.push(0);
                } else {
                    e.slots.push(value);
                }
                e.account(op);
                e.account(second);
                if is_jump {
                    e.close_block();
                }
                falls_through = second != opcode::JUMP;
                i = next_pc + 1;
                continue;
            }

            match inline {
                Some(v) => {
                    e.slots.push(op as u64);
                    e.slots.push(v);
                }
                None => {
                    e.constants.push(value);
                    e.slots.push(synthetic::PUSH_CONST as u64);
                    e.slots.push((e.constants.len() - 1) as u64);
                }
            }
            e.account(op);
            falls_through = true;
            i = next_pc;
            continue;
        }

        match op {
            opcode::PC => {
                e.slots.push(opcode::PC as u64);
                e.slots.push(i as u64);
            }
            _ => e.slots.push(op as u64),
        }
        e.account(op);

        if info.is_terminating() || matches!(op, opcode::JUMP | opcode::JUMPI) || observes_gas(op)
        {
            e.close_block();
        }
        falls_through = !info.is_terminating() && op != opcode::JUMP;
        i += 1;
    }

    // Code that can run off the end stops implicitly.
    if falls_through {
        e.ensure_block();
        e.slots.push(opcode::STOP as u64);
        e.account(opcode::STOP);
        e.close_block();
    }

    let jump_table = JumpTable::new(e.jump_pairs);
    for (slot, target_pc) in e.fixups {
        let dest = jump_table
            .lookup(target_pc as usize)
            .expect("fused jump target was validated");
        e.slots[slot] = dest as u64;
    }

    let code_hash = keccak256(&code);
    Ok(InstructionStream::new(
        code,
        code_hash,
        spec,
        e.slots,
        e.constants,
        e.blocks,
        jump_table,
    ))
}

/// First scan: opcode availability, PUSH truncation, and the `JUMPDEST`
/// bitmap with PUSH-immediate bytes excluded.
fn validate(code: &[u8], spec: SpecId) -> Result<BitVec<u8, Lsb0>, AnalysisError> {
    let mut jumpdests = bitvec![u8, Lsb0; 0; code.len()];
    let mut i = 0;
    while i < code.len() {
        let op = code[i];
        let Some(info) = opcode::info(op) else {
            return Err(AnalysisError::OpcodeNotDefined { opcode: op, pc: i });
        };
        if !info.is_enabled_in(spec) {
            return Err(AnalysisError::OpcodeNotDefined { opcode: op, pc: i });
        }
        if op == opcode::JUMPDEST {
            jumpdests.set(i, true);
        }
        let imm = info.immediate_size() as usize;
        if imm > 0 && i + imm >= code.len() {
            return Err(AnalysisError::TruncatedPush { pc: i });
        }
        i += 1 + imm;
    }
    Ok(jumpdests)
}

/// Naive per-instruction recomputation of block requirements, used by tests
/// to cross-check the analyzer.
#[cfg(test)]
fn simulate_block(ops: &[(u8, u64)]) -> BlockInfo {
    let mut acc = BlockAcc::default();
    for &(op, gas) in ops {
        acc.account(&opcode::info(op).unwrap(), gas);
    }
    acc.finish()
}
