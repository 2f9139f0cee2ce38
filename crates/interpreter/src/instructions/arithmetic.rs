//! Arithmetic handlers. Static gas is paid at block entry; only `EXP`
//! carries a dynamic surcharge.

use super::i256::{i256_div, i256_mod};
use crate::{gas, host::Host, interpreter::InstructionContext};
use primitives::U256;

pub fn add<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1.wrapping_add(*op2);
    ctx.interpreter.next();
}

pub fn mul<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1.wrapping_mul(*op2);
    ctx.interpreter.next();
}

pub fn sub<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1.wrapping_sub(*op2);
    ctx.interpreter.next();
}

pub fn div<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1.checked_div(*op2).unwrap_or_default();
    ctx.interpreter.next();
}

pub fn sdiv<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = i256_div(op1, *op2);
    ctx.interpreter.next();
}

pub fn rem<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1.checked_rem(*op2).unwrap_or_default();
    ctx.interpreter.next();
}

pub fn smod<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = i256_mod(op1, *op2);
    ctx.interpreter.next();
}

pub fn addmod<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1, op2], op3, ctx);
    *op3 = op1.add_mod(op2, *op3);
    ctx.interpreter.next();
}

pub fn mulmod<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1, op2], op3, ctx);
    *op3 = op1.mul_mod(op2, *op3);
    ctx.interpreter.next();
}

pub fn exp<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    let spec = ctx.interpreter.spec;
    popn_top!([op1], op2, ctx);
    gas_or_fail!(ctx, gas::exp_dynamic_cost(spec, *op2));
    *op2 = op1.pow(*op2);
    ctx.interpreter.next();
}

/// `SIGNEXTEND` extends the sign of the `ext`-th byte of `x` to the full
/// word.
pub fn signextend<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([ext], x, ctx);
    if ext < U256::from(31) {
        let ext = ext.as_limbs()[0];
        let bit_index = (8 * ext + 7) as usize;
        let bit = x.bit(bit_index);
        let mask = (U256::from(1) << bit_index) - U256::from(1);
        *x = if bit { *x | !mask } else { *x & mask };
    }
    ctx.interpreter.next();
}

#[cfg(test)]
mod tests {
    use crate::instructions::testing::run_block;
    use primitives::U256;

    #[test]
    fn division_by_zero_is_zero() {
        // PUSH1 0, PUSH1 7, DIV → 7 / 0 = 0
        let interp = run_block(&[0x60, 0x00, 0x60, 0x07, 0x04, 0x00]);
        assert_eq!(interp.stack.data(), &[U256::ZERO]);
    }

    #[test]
    fn signed_min_div_minus_one() {
        // PUSH32 -1, PUSH32 MIN, SDIV → MIN
        let mut code = vec![0x7f];
        code.extend_from_slice(&[0xff; 32]);
        code.push(0x7f);
        code.push(0x80);
        code.extend_from_slice(&[0x00; 31]);
        code.push(0x05);
        code.push(0x00);
        let interp = run_block(&code);
        assert_eq!(
            interp.stack.data(),
            &[crate::instructions::i256::MIN_NEGATIVE_VALUE]
        );
    }

    #[test]
    fn exp_charges_per_byte() {
        // PUSH2 0x0100, PUSH1 2, EXP → 2^256 wraps to 0.
        let interp = run_block(&[0x61, 0x01, 0x00, 0x60, 0x02, 0x0a, 0x00]);
        assert_eq!(interp.stack.data(), &[U256::ZERO]);
        // Static: 3 + 3 + 10 + 0(stop); dynamic: 2 bytes * 50.
        assert_eq!(interp.gas.spent(), 16 + 100);
    }

    #[test]
    fn signextend_of_byte_zero() {
        // PUSH1 0xff, PUSH1 0, SIGNEXTEND → -1
        let interp = run_block(&[0x60, 0xff, 0x60, 0x00, 0x0b, 0x00]);
        assert_eq!(interp.stack.data(), &[U256::MAX]);
    }
}
