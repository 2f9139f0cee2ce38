//! Dynamic gas calculators: the state- and size-dependent surcharges that
//! handlers pay on top of the static gas charged at block entry.

use super::constants::*;
use primitives::{SpecId, U256};
use state::SelfDestructResult;

/// Per-word cost of a length in bytes.
#[inline]
pub const fn cost_per_word(len: u64, multiple: u64) -> Option<u64> {
    multiple.checked_mul(len.div_ceil(32))
}

/// Word-granular copy surcharge for the `*COPY` family.
#[inline]
pub const fn copy_cost(len: u64) -> Option<u64> {
    cost_per_word(len, COPY)
}

/// `KECCAK256` per-word surcharge.
#[inline]
pub const fn keccak256_word_cost(len: u64) -> Option<u64> {
    cost_per_word(len, KECCAK256WORD)
}

/// `LOG` data surcharge; topics are part of the static cost.
#[inline]
pub const fn log_data_cost(len: u64) -> Option<u64> {
    LOGDATA.checked_mul(len)
}

/// `CREATE2` hashing surcharge over the static `CREATE` cost.
#[inline]
pub const fn create2_hash_cost(len: u64) -> Option<u64> {
    cost_per_word(len, KECCAK256WORD)
}

/// EIP-3860 init code word cost. The length is below the checked init code
/// limit, so this cannot overflow.
#[inline]
pub const fn initcode_cost(len: u64) -> u64 {
    let Some(cost) = cost_per_word(len, INITCODE_WORD_COST) else {
        panic!("initcode cost overflow")
    };
    cost
}

#[inline]
const fn log2floor(value: U256) -> u64 {
    let mut l: u64 = 256;
    let mut i = 3;
    loop {
        if value.as_limbs()[i] == 0u64 {
            l -= 64;
        } else {
            l -= value.as_limbs()[i].leading_zeros() as u64;
            if l == 0 {
                return l;
            } else {
                return l - 1;
            }
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }
    l
}

/// `EXP` per-byte surcharge over its static base.
#[inline]
pub fn exp_dynamic_cost(spec: SpecId, power: U256) -> Option<u64> {
    if power == U256::ZERO {
        return Some(0);
    }
    // EIP-160 raised the per-byte price.
    let gas_byte: u64 = if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        50
    } else {
        10
    };
    gas_byte.checked_mul(log2floor(power) / 8 + 1)
}

/// Cold-account surcharge over the warm base charged at block entry.
/// Pre-Berlin the static cost already covers the access.
#[inline]
pub const fn cold_account_surcharge(spec: SpecId, is_cold: bool) -> u64 {
    if spec.is_enabled_in(SpecId::BERLIN) && is_cold {
        COLD_ACCOUNT_SURCHARGE
    } else {
        0
    }
}

/// Cold-slot surcharge for `SLOAD` over the warm base.
#[inline]
pub const fn cold_sload_surcharge(spec: SpecId, is_cold: bool) -> u64 {
    if spec.is_enabled_in(SpecId::BERLIN) && is_cold {
        COLD_SLOAD_SURCHARGE
    } else {
        0
    }
}

/// `SSTORE` cost. Fully dynamic: nothing is charged at block entry.
///
/// Returns `None` below the EIP-1706 stipend sentry.
#[inline]
pub fn sstore_cost(
    spec: SpecId,
    original: U256,
    current: U256,
    new: U256,
    remaining_gas: u64,
    is_cold: bool,
) -> Option<u64> {
    // EIP-1706: reject SSTORE with gas left at or below the call stipend.
    if spec.is_enabled_in(SpecId::ISTANBUL) && remaining_gas <= CALL_STIPEND {
        return None;
    }

    if spec.is_enabled_in(SpecId::BERLIN) {
        let mut gas_cost =
            istanbul_sstore_cost::<WARM_STORAGE_READ_COST, WARM_SSTORE_RESET>(original, current, new);
        if is_cold {
            gas_cost += COLD_SLOAD_COST;
        }
        Some(gas_cost)
    } else if spec.is_enabled_in(SpecId::ISTANBUL) {
        Some(istanbul_sstore_cost::<ISTANBUL_SLOAD_GAS, SSTORE_RESET>(
            original, current, new,
        ))
    } else {
        Some(frontier_sstore_cost(current, new))
    }
}

/// EIP-2200: structured definitions for net gas metering.
#[inline]
fn istanbul_sstore_cost<const SLOAD_GAS: u64, const SSTORE_RESET_GAS: u64>(
    original: U256,
    current: U256,
    new: U256,
) -> u64 {
    if new == current {
        SLOAD_GAS
    } else if original == current && original == U256::ZERO {
        SSTORE_SET
    } else if original == current {
        SSTORE_RESET_GAS
    } else {
        SLOAD_GAS
    }
}

/// Frontier `SSTORE` had only set and reset prices.
#[inline]
fn frontier_sstore_cost(current: U256, new: U256) -> u64 {
    if current == U256::ZERO && new != U256::ZERO {
        SSTORE_SET
    } else {
        SSTORE_RESET
    }
}

/// `SSTORE` refund per EIP-2200 and the EIP-3529 reduction.
#[allow(clippy::collapsible_else_if)]
#[inline]
pub fn sstore_refund(spec: SpecId, original: U256, current: U256, new: U256) -> i64 {
    if spec.is_enabled_in(SpecId::ISTANBUL) {
        let sstore_clears_schedule = if spec.is_enabled_in(SpecId::LONDON) {
            (SSTORE_RESET - COLD_SLOAD_COST + ACCESS_LIST_STORAGE_KEY) as i64
        } else {
            REFUND_SSTORE_CLEARS
        };
        if current == new {
            0
        } else {
            if original == current && new == U256::ZERO {
                sstore_clears_schedule
            } else {
                let mut refund = 0;

                if original != U256::ZERO {
                    if current == U256::ZERO {
                        refund -= sstore_clears_schedule;
                    } else if new == U256::ZERO {
                        refund += sstore_clears_schedule;
                    }
                }

                if original == new {
                    let (gas_sstore_reset, gas_sload) = if spec.is_enabled_in(SpecId::BERLIN) {
                        (SSTORE_RESET - COLD_SLOAD_COST, WARM_STORAGE_READ_COST)
                    } else {
                        (SSTORE_RESET, ISTANBUL_SLOAD_GAS)
                    };
                    if original == U256::ZERO {
                        refund += (SSTORE_SET - gas_sload) as i64;
                    } else {
                        refund += (gas_sstore_reset - gas_sload) as i64;
                    }
                }

                refund
            }
        }
    } else {
        if current != U256::ZERO && new == U256::ZERO {
            REFUND_SSTORE_CLEARS
        } else {
            0
        }
    }
}

/// Dynamic part of a call's cost: cold-account surcharge, value transfer and
/// new-account accounting. The warm access base is static.
#[inline]
pub const fn call_dynamic_cost(
    spec: SpecId,
    transfers_value: bool,
    is_cold: bool,
    new_account_accounting: bool,
) -> u64 {
    let mut gas = cold_account_surcharge(spec, is_cold);
    if transfers_value {
        gas += CALLVALUE;
    }
    if new_account_accounting {
        // EIP-161: after state clearing, only value-bearing calls can bring
        // an account to life.
        if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
            if transfers_value {
                gas += NEWACCOUNT;
            }
        } else {
            gas += NEWACCOUNT;
        }
    }
    gas
}

/// Dynamic part of `SELFDESTRUCT`: new-account top-up and cold access. The
/// base 5000 (post-Tangerine) is static.
#[inline]
pub const fn selfdestruct_dynamic_cost(
    spec: SpecId,
    res: SelfDestructResult,
    is_cold: bool,
) -> u64 {
    // EIP-161 narrowed the top-up to value-bearing destructions.
    let should_charge_topup = if spec.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        res.had_value && !res.target_exists
    } else {
        !res.target_exists
    };

    let mut gas = if spec.is_enabled_in(SpecId::TANGERINE) && should_charge_topup {
        25000
    } else {
        0
    };
    if spec.is_enabled_in(SpecId::BERLIN) && is_cold {
        gas += COLD_ACCOUNT_ACCESS_COST;
    }
    gas
}

/// Quadratic memory expansion cost of `words` words.
#[inline]
pub const fn memory_gas(words: usize) -> u64 {
    let words = words as u64;
    MEMORY
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / 512)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cost_is_quadratic() {
        assert_eq!(memory_gas(0), 0);
        assert_eq!(memory_gas(1), 3);
        assert_eq!(memory_gas(32), 32 * 3 + 2);
        // 16 MiB worth of words.
        let words = 16 * 1024 * 1024 / 32;
        assert_eq!(
            memory_gas(words),
            3 * words as u64 + (words * words) as u64 / 512
        );
    }

    #[test]
    fn exp_byte_pricing() {
        assert_eq!(exp_dynamic_cost(SpecId::CANCUN, U256::ZERO), Some(0));
        assert_eq!(exp_dynamic_cost(SpecId::CANCUN, U256::from(255)), Some(50));
        assert_eq!(exp_dynamic_cost(SpecId::CANCUN, U256::from(256)), Some(100));
        assert_eq!(exp_dynamic_cost(SpecId::HOMESTEAD, U256::from(256)), Some(20));
    }

    #[test]
    fn istanbul_net_metering_restoration_refund() {
        // original 10, write 20 then write back 10.
        let original = U256::from(10);
        let refund_first = sstore_refund(SpecId::CANCUN, original, original, U256::from(20));
        assert_eq!(refund_first, 0);
        let refund_second =
            sstore_refund(SpecId::CANCUN, original, U256::from(20), original);
        // Restoring a non-zero original refunds reset - warm read.
        assert_eq!(refund_second, (SSTORE_RESET - COLD_SLOAD_COST - WARM_STORAGE_READ_COST) as i64);
    }

    #[test]
    fn sstore_sentry() {
        assert_eq!(
            sstore_cost(
                SpecId::CANCUN,
                U256::ZERO,
                U256::ZERO,
                U256::from(1),
                CALL_STIPEND,
                false
            ),
            None
        );
    }
}
