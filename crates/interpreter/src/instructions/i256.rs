//! Two's-complement interpretation helpers for the signed opcodes.

use core::cmp::Ordering;
use primitives::U256;

/// Sign bit mask of a 256-bit word.
const SIGN_BIT: U256 = U256::from_limbs([0, 0, 0, 0x8000_0000_0000_0000]);

/// `-2^255`, the only value whose negation overflows.
pub const MIN_NEGATIVE_VALUE: U256 = SIGN_BIT;

#[inline]
fn is_negative(value: U256) -> bool {
    value.bit(255)
}

#[inline]
fn twos_neg(value: U256) -> U256 {
    value.wrapping_neg()
}

/// Signed comparison.
#[inline]
pub fn i256_cmp(first: U256, second: U256) -> Ordering {
    match (is_negative(first), is_negative(second)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => first.cmp(&second),
    }
}

/// Signed division. Division by zero yields zero; `MIN / -1` yields `MIN`.
#[inline]
pub fn i256_div(first: U256, second: U256) -> U256 {
    if second.is_zero() {
        return U256::ZERO;
    }
    if first == MIN_NEGATIVE_VALUE && second == U256::MAX {
        // MIN / -1 overflows back to MIN.
        return MIN_NEGATIVE_VALUE;
    }

    let first_neg = is_negative(first);
    let second_neg = is_negative(second);
    let first_abs = if first_neg { twos_neg(first) } else { first };
    let second_abs = if second_neg { twos_neg(second) } else { second };

    let quotient = first_abs.wrapping_div(second_abs);
    if first_neg != second_neg {
        twos_neg(quotient)
    } else {
        quotient
    }
}

/// Signed remainder. The result takes the sign of the dividend.
#[inline]
pub fn i256_mod(first: U256, second: U256) -> U256 {
    if second.is_zero() {
        return U256::ZERO;
    }

    let first_neg = is_negative(first);
    let second_neg = is_negative(second);
    let first_abs = if first_neg { twos_neg(first) } else { first };
    let second_abs = if second_neg { twos_neg(second) } else { second };

    let remainder = first_abs.wrapping_rem(second_abs);
    if first_neg {
        twos_neg(remainder)
    } else {
        remainder
    }
}
