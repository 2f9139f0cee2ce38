//! The analyzed instruction stream and its lookup structures.

use primitives::{Bytes, SpecId, B256, U256};

/// Precomputed requirements of a basic block, validated in one shot when the
/// block is entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockInfo {
    /// Sum of the static gas of every instruction in the block.
    pub gas_cost: u32,
    /// Minimum stack depth required on entry.
    pub stack_req: u16,
    /// Peak net stack growth reached inside the block.
    pub stack_max_growth: u16,
}

/// Sorted map from the bytecode pc of every valid `JUMPDEST` to its slot
/// index in the stream. Dynamic jumps binary-search it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpTable {
    pairs: Box<[(u32, u32)]>,
}

impl JumpTable {
    /// Builds a table from `(pc, slot)` pairs that are already sorted by pc.
    #[inline]
    pub fn new(pairs: Vec<(u32, u32)>) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
        Self {
            pairs: pairs.into_boxed_slice(),
        }
    }

    /// Number of valid jump destinations.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if the code has no jump destinations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the slot index of the `JUMPDEST` at `pc`, if `pc` is a valid
    /// destination.
    #[inline]
    pub fn lookup(&self, pc: usize) -> Option<usize> {
        let pc = u32::try_from(pc).ok()?;
        self.pairs
            .binary_search_by_key(&pc, |&(p, _)| p)
            .ok()
            .map(|i| self.pairs[i].1 as usize)
    }

    /// Whether `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid(&self, pc: usize) -> bool {
        self.lookup(pc).is_some()
    }

    /// Iterates `(pc, slot)` pairs in pc order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Output of bytecode analysis: a flat sequence of word-sized slots plus its
/// side tables. Immutable once produced; the interpreter borrows it for the
/// duration of a frame (shared via `Arc` by the analysis cache).
///
/// Each visible instruction contributes one handler slot holding the opcode
/// (or synthetic id) and at most one metadata slot holding an inline
/// immediate, a constants-table index, a block index, a destination slot, or
/// a bytecode pc.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionStream {
    code: Bytes,
    code_hash: B256,
    spec: SpecId,
    slots: Box<[u64]>,
    constants: Box<[U256]>,
    blocks: Box<[BlockInfo]>,
    jump_table: JumpTable,
}

impl InstructionStream {
    pub(crate) fn new(
        code: Bytes,
        code_hash: B256,
        spec: SpecId,
        slots: Vec<u64>,
        constants: Vec<U256>,
        blocks: Vec<BlockInfo>,
        jump_table: JumpTable,
    ) -> Self {
        Self {
            code,
            code_hash,
            spec,
            slots: slots.into_boxed_slice(),
            constants: constants.into_boxed_slice(),
            blocks: blocks.into_boxed_slice(),
            jump_table,
        }
    }

    /// The raw bytecode the stream was produced from, as seen by `CODECOPY`.
    #[inline]
    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// keccak256 of the raw bytecode.
    #[inline]
    pub fn code_hash(&self) -> B256 {
        self.code_hash
    }

    /// Hardfork the stream was analyzed for.
    #[inline]
    pub fn spec(&self) -> SpecId {
        self.spec
    }

    /// Number of slots in the stream.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the stream holds no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handler id stored in the slot at `idx`.
    ///
    /// Every reachable index holds a handler slot; metadata slots are only
    /// read through [`Self::metadata`] and are never dispatched on.
    #[inline]
    pub fn op(&self, idx: usize) -> u16 {
        self.slots[idx] as u16
    }

    /// Metadata slot following the handler slot at `idx`.
    #[inline]
    pub fn metadata(&self, idx: usize) -> u64 {
        self.slots[idx + 1]
    }

    /// Oversize PUSH immediate from the constants side table.
    #[inline]
    pub fn constant(&self, idx: usize) -> U256 {
        self.constants[idx]
    }

    /// Basic-block metadata record.
    #[inline]
    pub fn block(&self, idx: usize) -> BlockInfo {
        self.blocks[idx]
    }

    /// Number of basic blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The jump table for dynamic `JUMP`/`JUMPI` targets.
    #[inline]
    pub fn jump_table(&self) -> &JumpTable {
        &self.jump_table
    }

    /// Raw slots, exposed for debugging and structural tests.
    #[inline]
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_table_lookup() {
        let table = JumpTable::new(vec![(0, 2), (5, 9), (40, 80)]);
        assert_eq!(table.lookup(0), Some(2));
        assert_eq!(table.lookup(5), Some(9));
        assert_eq!(table.lookup(40), Some(80));
        assert_eq!(table.lookup(1), None);
        assert_eq!(table.lookup(41), None);
        assert!(table.is_valid(5));
        assert!(!table.is_valid(6));
    }

    #[test]
    fn jump_table_oversize_pc() {
        let table = JumpTable::new(vec![(0, 2)]);
        assert_eq!(table.lookup(u64::MAX as usize), None);
    }
}
