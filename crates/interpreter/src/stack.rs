//! The 1024-word operand stack.
//!
//! Handlers run behind the analyzer's per-block stack validation, so the hot
//! path uses unchecked primitives; checked variants exist for the public
//! API and debugging harnesses.

use crate::InstructionResult;
use core::fmt;
use primitives::{U256, STACK_LIMIT};

/// EVM operand stack with a fixed capacity of [`STACK_LIMIT`] words.
#[derive(Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stack {
    /// The underlying data. Capacity is allocated up front so unchecked
    /// pushes never reallocate.
    data: Vec<U256>,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("]")
    }
}

impl Default for Stack {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Stack {
    fn clone(&self) -> Self {
        // Preserve the full-capacity invariant of `new`.
        let mut stack = Self::new();
        stack.data.extend_from_slice(&self.data);
        stack
    }
}

impl Stack {
    /// Instantiates a new stack with the full [`STACK_LIMIT`] capacity.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(STACK_LIMIT),
        }
    }

    /// Current depth in words.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying data, bottom first.
    #[inline]
    pub fn data(&self) -> &[U256] {
        &self.data
    }

    /// Clears the stack, keeping its capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Checked pop.
    #[inline]
    pub fn pop(&mut self) -> Result<U256, InstructionResult> {
        self.data.pop().ok_or(InstructionResult::StackUnderflow)
    }

    /// Checked push; fails when the stack is full.
    #[inline]
    #[must_use]
    pub fn push(&mut self, value: U256) -> bool {
        if self.data.len() == STACK_LIMIT {
            return false;
        }
        self.data.push(value);
        true
    }

    /// Returns the word `n` entries below the top (0 is the top), checked.
    #[inline]
    pub fn peek(&self, n: usize) -> Result<U256, InstructionResult> {
        if n < self.data.len() {
            Ok(self.data[self.data.len() - 1 - n])
        } else {
            Err(InstructionResult::StackUnderflow)
        }
    }

    /// Unchecked push. The block's `stack_max_growth` bound guarantees
    /// capacity.
    #[inline]
    pub fn push_unchecked(&mut self, value: U256) {
        debug_assert!(self.data.len() < STACK_LIMIT);
        self.data.push(value);
    }

    /// Pops `N` words, first element topmost.
    ///
    /// # Safety
    ///
    /// The stack must hold at least `N` words, which block-entry validation
    /// establishes.
    #[inline]
    pub unsafe fn popn<const N: usize>(&mut self) -> [U256; N] {
        debug_assert!(self.data.len() >= N);
        let mut result = [U256::ZERO; N];
        for value in &mut result {
            let top = self.data.len() - 1;
            *value = *self.data.get_unchecked(top);
            self.data.set_len(top);
        }
        result
    }

    /// Pops `N` words and exposes the new top for in-place rewriting.
    ///
    /// # Safety
    ///
    /// The stack must hold at least `N + 1` words.
    #[inline]
    pub unsafe fn popn_top<const N: usize>(&mut self) -> ([U256; N], &mut U256) {
        debug_assert!(self.data.len() > N);
        let values = self.popn::<N>();
        let top = self.data.len() - 1;
        (values, self.data.get_unchecked_mut(top))
    }

    /// Duplicates the word `n` entries below the top (`DUP1` is `n == 1`).
    ///
    /// # Safety
    ///
    /// The stack must hold at least `n` words with room for one more.
    #[inline]
    pub unsafe fn dup(&mut self, n: usize) {
        debug_assert!(n >= 1 && self.data.len() >= n);
        debug_assert!(self.data.len() < STACK_LIMIT);
        let value = *self.data.get_unchecked(self.data.len() - n);
        self.data.push(value);
    }

    /// Swaps the top with the word `n` entries below it (`SWAP1` is
    /// `n == 1`).
    ///
    /// # Safety
    ///
    /// The stack must hold at least `n + 1` words.
    #[inline]
    pub unsafe fn swap(&mut self, n: usize) {
        debug_assert!(n >= 1 && self.data.len() > n);
        let top = self.data.len() - 1;
        self.data.swap(top, top - n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_bounds() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(InstructionResult::StackUnderflow));
        for i in 0..STACK_LIMIT {
            assert!(stack.push(U256::from(i)));
        }
        // Full stack: pushes fail, pops succeed.
        assert!(!stack.push(U256::ZERO));
        assert_eq!(stack.pop(), Ok(U256::from(STACK_LIMIT - 1)));
    }

    #[test]
    fn popn_orders_topmost_first() {
        let mut stack = Stack::new();
        assert!(stack.push(U256::from(1)));
        assert!(stack.push(U256::from(2)));
        assert!(stack.push(U256::from(3)));
        let [a, b] = unsafe { stack.popn::<2>() };
        assert_eq!(a, U256::from(3));
        assert_eq!(b, U256::from(2));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn dup_and_swap() {
        let mut stack = Stack::new();
        assert!(stack.push(U256::from(10)));
        assert!(stack.push(U256::from(20)));
        unsafe { stack.dup(2) };
        assert_eq!(stack.peek(0), Ok(U256::from(10)));
        unsafe { stack.swap(1) };
        assert_eq!(stack.peek(0), Ok(U256::from(20)));
        assert_eq!(stack.peek(1), Ok(U256::from(10)));
    }
}
