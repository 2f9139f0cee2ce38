//! Gas accounting.
//!
//! The static portion of every opcode's cost is charged when its basic block
//! is entered; everything here deals with the frame-level bookkeeping and
//! the dynamic surcharges handlers pay before their side effects.

pub mod calc;
pub mod constants;

pub use calc::*;
pub use constants::*;

/// State of gas during execution of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gas {
    /// The initial gas limit, constant throughout execution.
    limit: u64,
    /// The remaining gas.
    remaining: u64,
    /// Refunded gas, settled only at the end of the transaction.
    refunded: i64,
    /// Memoized memory expansion state.
    pub memory: MemoryGas,
}

impl Gas {
    /// Creates a new `Gas` with the given limit.
    #[inline]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// Creates a new `Gas` with the given limit and no gas remaining.
    #[inline]
    pub const fn new_spent(limit: u64) -> Self {
        Self {
            limit,
            remaining: 0,
            refunded: 0,
            memory: MemoryGas::new(),
        }
    }

    /// The gas limit.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Total refund recorded so far.
    #[inline]
    pub const fn refunded(&self) -> i64 {
        self.refunded
    }

    /// Total gas spent.
    #[inline]
    pub const fn spent(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Gas spent minus the settled refund.
    #[inline]
    pub const fn spent_sub_refunded(&self) -> u64 {
        self.spent().saturating_sub(self.refunded as u64)
    }

    /// Remaining gas.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Remaining gas after withholding the EIP-150 1/64 part.
    #[inline]
    pub const fn remaining_63_of_64_parts(&self) -> u64 {
        self.remaining - self.remaining / 64
    }

    /// Returns unused gas from a finished child frame.
    #[inline]
    pub fn erase_cost(&mut self, returned: u64) {
        self.remaining += returned;
    }

    /// Spends all remaining gas.
    #[inline]
    pub fn spend_all(&mut self) {
        self.remaining = 0;
    }

    /// Records a refund. May be negative while net metering, but the total
    /// is non-negative at transaction end.
    #[inline]
    pub fn record_refund(&mut self, refund: i64) {
        self.refunded += refund;
    }

    /// Caps the refund at the EIP-3529 quotient of spent gas
    /// (pre-London: half).
    #[inline]
    pub fn set_final_refund(&mut self, is_london: bool) {
        let max_refund_quotient = if is_london { 5 } else { 2 };
        self.refunded = (self.refunded() as u64).min(self.spent() / max_refund_quotient) as i64;
    }

    /// Overrides the refund counter.
    #[inline]
    pub fn set_refund(&mut self, refund: i64) {
        self.refunded = refund;
    }

    /// Records a cost, returning `false` if it exceeds the remaining gas.
    #[inline]
    #[must_use = "prefer using `gas!` instead to return an out-of-gas error on failure"]
    pub fn record_cost(&mut self, cost: u64) -> bool {
        if let Some(new_remaining) = self.remaining.checked_sub(cost) {
            self.remaining = new_remaining;
            return true;
        }
        false
    }

    /// Charges the incremental expansion cost to `new_words` words of
    /// memory.
    #[inline]
    #[must_use = "flags an out-of-gas condition"]
    pub fn record_memory_expansion(&mut self, new_words: usize) -> MemoryExtensionResult {
        let Some(additional_cost) = self.memory.record_new_words(new_words) else {
            return MemoryExtensionResult::Same;
        };
        if !self.record_cost(additional_cost) {
            return MemoryExtensionResult::OutOfGas;
        }
        MemoryExtensionResult::Extended
    }
}

/// Outcome of a memory expansion charge.
pub enum MemoryExtensionResult {
    /// Memory was extended.
    Extended,
    /// Memory size stayed the same.
    Same,
    /// Not enough gas to extend.
    OutOfGas,
}

/// Memoization of the quadratic memory expansion cost, so each expansion
/// charges only the increment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryGas {
    /// Current memory length in words.
    pub words_num: usize,
    /// Expansion cost already charged for that length.
    pub expansion_cost: u64,
}

impl MemoryGas {
    /// Fresh state: no memory charged yet.
    #[inline]
    pub const fn new() -> Self {
        Self {
            words_num: 0,
            expansion_cost: 0,
        }
    }

    /// Records growth to `new_words`, returning the incremental cost, or
    /// `None` if the memory does not grow.
    #[inline]
    pub fn record_new_words(&mut self, new_words: usize) -> Option<u64> {
        if new_words <= self.words_num {
            return None;
        }
        self.words_num = new_words;
        let mut cost = calc::memory_gas(new_words);
        core::mem::swap(&mut self.expansion_cost, &mut cost);
        // The swap leaves the previous cost in `cost`; growth makes the
        // subtraction safe.
        Some(self.expansion_cost - cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_erase() {
        let mut gas = Gas::new(100);
        assert!(gas.record_cost(30));
        assert_eq!(gas.remaining(), 70);
        assert_eq!(gas.spent(), 30);
        assert!(!gas.record_cost(71));
        gas.erase_cost(10);
        assert_eq!(gas.remaining(), 80);
    }

    #[test]
    fn memory_expansion_is_incremental() {
        let mut gas = Gas::new(10_000);
        assert!(matches!(
            gas.record_memory_expansion(1),
            MemoryExtensionResult::Extended
        ));
        let after_one_word = gas.remaining();
        assert_eq!(Gas::new(10_000).remaining() - after_one_word, 3);
        // Same size charges nothing.
        assert!(matches!(
            gas.record_memory_expansion(1),
            MemoryExtensionResult::Same
        ));
        assert_eq!(gas.remaining(), after_one_word);
    }

    #[test]
    fn final_refund_cap() {
        let mut gas = Gas::new(100_000);
        assert!(gas.record_cost(50_000));
        gas.record_refund(30_000);
        gas.set_final_refund(true);
        assert_eq!(gas.refunded(), 10_000);

        let mut gas = Gas::new(100_000);
        assert!(gas.record_cost(50_000));
        gas.record_refund(30_000);
        gas.set_final_refund(false);
        assert_eq!(gas.refunded(), 25_000);
    }
}
