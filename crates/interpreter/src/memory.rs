//! Linear memory shared between the frames of a call stack.
//!
//! One growable buffer is allocated per transaction. Each frame sees the
//! suffix past its checkpoint as its own zero-based memory; child frames
//! push a checkpoint at the parent's high-water mark and can only grow past
//! it. Expansion is charged quadratically per EIP-150 through the `Gas`
//! memoization before the buffer is touched.

use crate::{
    gas::{Gas, MemoryExtensionResult},
    InstructionResult,
};
use core::{
    cmp::min,
    fmt,
    ops::{BitAnd, Not},
};
use primitives::{B256, U256};

/// A sequential memory region shared between calls, with checkpoint-based
/// isolation of the current context.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharedMemory {
    /// The shared buffer.
    data: Vec<u8>,
    /// Checkpoint offsets, one per active child context.
    checkpoints: Vec<usize>,
    /// Memory length of the current context.
    current_len: usize,
    /// Upper bound on the whole buffer.
    memory_limit: u64,
}

impl SharedMemory {
    /// Allocates the transaction's shared memory with the default limit.
    /// The initial 4 KiB capacity grows on demand.
    pub fn new() -> Self {
        Self::with_memory_limit(primitives::DEFAULT_MEMORY_LIMIT)
    }

    /// Allocates shared memory bounded by `memory_limit` bytes.
    pub fn with_memory_limit(memory_limit: u64) -> Self {
        Self {
            data: Vec::with_capacity(4 * 1024),
            checkpoints: Vec::with_capacity(32),
            current_len: 0,
            memory_limit,
        }
    }

    /// Whether growing the current context to `new_size` would exceed the
    /// limit.
    #[inline]
    pub fn limit_reached(&self, new_size: usize) -> bool {
        (self.last_checkpoint() + new_size) as u64 > self.memory_limit
    }

    /// Prepares the memory for a child frame: the child's logical zero is
    /// the parent's current end.
    pub fn new_child_context(&mut self) {
        let base_offset = self.last_checkpoint();
        self.checkpoints.push(base_offset + self.current_len);
        self.current_len = 0;
    }

    /// Returns to the parent context. The parent's length is unchanged; the
    /// child's bytes past it are dead.
    pub fn free_child_context(&mut self) {
        if let Some(old_checkpoint) = self.checkpoints.pop() {
            self.current_len = old_checkpoint - self.last_checkpoint();
        }
    }

    /// Length of the current context in bytes, always a multiple of 32 at
    /// instruction boundaries.
    #[inline]
    pub fn len(&self) -> usize {
        self.current_len
    }

    /// Whether the current context has no memory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current_len == 0
    }

    /// Grows the current context to `new_size` bytes, zeroing fresh memory.
    /// The caller has already 32-byte-aligned the size, charged gas and
    /// checked the limit.
    #[inline]
    pub fn resize(&mut self, new_size: usize) {
        let last_checkpoint = self.last_checkpoint();
        let range = last_checkpoint + self.current_len..last_checkpoint + new_size;
        if let Some(available) = self.data.get_mut(range) {
            available.fill(0);
        } else {
            self.data
                .resize(last_checkpoint + usize::max(new_size, 4 * 1024), 0);
        }
        self.current_len = new_size;
    }

    /// Truncates the owned buffer. Used when the top-level frame completes.
    pub fn clear(&mut self) {
        debug_assert!(self.checkpoints.is_empty(), "clearing borrowed memory");
        self.data.clear();
        self.current_len = 0;
    }

    /// Borrowed view of `size` bytes at `offset` of the current context.
    ///
    /// Panics when out of bounds; handlers resize first.
    #[inline]
    #[cfg_attr(debug_assertions, track_caller)]
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        let last_checkpoint = self.last_checkpoint();
        &self.data[last_checkpoint + offset..last_checkpoint + offset + size]
    }

    /// Mutable view of `size` bytes at `offset` of the current context.
    #[inline]
    #[cfg_attr(debug_assertions, track_caller)]
    pub fn slice_mut(&mut self, offset: usize, size: usize) -> &mut [u8] {
        let last_checkpoint = self.last_checkpoint();
        &mut self.data[last_checkpoint + offset..last_checkpoint + offset + size]
    }

    /// Sets a single byte.
    #[inline]
    pub fn set_byte(&mut self, offset: usize, byte: u8) {
        self.slice_mut(offset, 1)[0] = byte;
    }

    /// Reads a 32-byte big-endian word.
    #[inline]
    pub fn get_word(&self, offset: usize) -> B256 {
        B256::from_slice(self.slice(offset, 32))
    }

    /// Writes a 32-byte big-endian word.
    #[inline]
    pub fn set_word(&mut self, offset: usize, value: U256) {
        self.set(offset, &value.to_be_bytes::<32>());
    }

    /// Writes `value` at `offset` without expansion semantics.
    #[inline]
    pub fn set(&mut self, offset: usize, value: &[u8]) {
        if !value.is_empty() {
            self.slice_mut(offset, value.len()).copy_from_slice(value);
        }
    }

    /// Copies `len` bytes of `data` starting at `data_offset` into memory at
    /// `memory_offset`, zero-filling past the end of `data`. Memory is
    /// already sized; `data_offset` and `len` are untrusted.
    #[inline]
    pub fn set_data(&mut self, memory_offset: usize, data_offset: usize, len: usize, data: &[u8]) {
        if data_offset >= data.len() {
            self.slice_mut(memory_offset, len).fill(0);
            return;
        }
        let data_end = min(data_offset + len, data.len());
        let copy_len = data_end - data_offset;
        self.slice_mut(memory_offset, copy_len)
            .copy_from_slice(&data[data_offset..data_end]);
        self.slice_mut(memory_offset + copy_len, len - copy_len)
            .fill(0);
    }

    /// Copies within the current context (`MCOPY`).
    #[inline]
    pub fn copy(&mut self, dst: usize, src: usize, len: usize) {
        self.context_memory_mut().copy_within(src..src + len, dst);
    }

    #[inline]
    fn context_memory(&self) -> &[u8] {
        let last_checkpoint = self.last_checkpoint();
        &self.data[last_checkpoint..last_checkpoint + self.current_len]
    }

    #[inline]
    fn context_memory_mut(&mut self) -> &mut [u8] {
        let last_checkpoint = self.last_checkpoint();
        let current_len = self.current_len;
        &mut self.data[last_checkpoint..last_checkpoint + current_len]
    }

    #[inline]
    fn last_checkpoint(&self) -> usize {
        self.checkpoints.last().copied().unwrap_or_default()
    }
}

impl fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMemory")
            .field("current_len", &self.current_len)
            .field("context_memory", &primitives::hex::encode(self.context_memory()))
            .finish_non_exhaustive()
    }
}

impl Default for SharedMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounds `x` up to the next multiple of 32.
#[inline]
pub fn next_multiple_of_32(x: usize) -> Option<usize> {
    let r = x.bitand(31).not().wrapping_add(1).bitand(31);
    x.checked_add(r)
}

/// Grows the current context to cover `offset + len` bytes, charging the
/// incremental expansion cost. The single gas/limit gate for every
/// memory-touching handler.
#[inline]
pub fn resize_memory(
    gas: &mut Gas,
    memory: &mut SharedMemory,
    offset: usize,
    len: usize,
) -> Result<(), InstructionResult> {
    if len == 0 {
        return Ok(());
    }
    let Some(end) = offset.checked_add(len) else {
        return Err(InstructionResult::InvalidOperandOOG);
    };
    if end <= memory.len() {
        return Ok(());
    }
    let Some(rounded) = next_multiple_of_32(end) else {
        return Err(InstructionResult::InvalidOperandOOG);
    };
    if memory.limit_reached(rounded) {
        return Err(InstructionResult::MemoryLimitOOG);
    }
    match gas.record_memory_expansion(rounded / 32) {
        MemoryExtensionResult::Extended => memory.resize(rounded),
        MemoryExtensionResult::Same => {}
        MemoryExtensionResult::OutOfGas => return Err(InstructionResult::MemoryOOG),
    }
    Ok(())
}
