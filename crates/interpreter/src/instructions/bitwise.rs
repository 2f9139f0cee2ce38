//! Comparison and bitwise handlers.

use super::i256::i256_cmp;
use crate::{host::Host, interpreter::InstructionContext};
use core::cmp::Ordering;
use primitives::U256;

pub fn lt<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = U256::from(op1 < *op2);
    ctx.interpreter.next();
}

pub fn gt<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = U256::from(op1 > *op2);
    ctx.interpreter.next();
}

pub fn slt<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = U256::from(i256_cmp(op1, *op2) == Ordering::Less);
    ctx.interpreter.next();
}

pub fn sgt<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = U256::from(i256_cmp(op1, *op2) == Ordering::Greater);
    ctx.interpreter.next();
}

pub fn eq<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = U256::from(op1 == *op2);
    ctx.interpreter.next();
}

pub fn iszero<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([], op1, ctx);
    *op1 = U256::from(op1.is_zero());
    ctx.interpreter.next();
}

pub fn bitand<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1 & *op2;
    ctx.interpreter.next();
}

pub fn bitor<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1 | *op2;
    ctx.interpreter.next();
}

pub fn bitxor<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = op1 ^ *op2;
    ctx.interpreter.next();
}

pub fn not<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([], op1, ctx);
    *op1 = !*op1;
    ctx.interpreter.next();
}

/// `BYTE` picks the `op1`-th byte of `op2`, counting from the most
/// significant.
pub fn byte<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    popn_top!([op1], op2, ctx);
    *op2 = if op1 < U256::from(32) {
        let index = op1.as_limbs()[0] as usize;
        U256::from(op2.byte(31 - index))
    } else {
        U256::ZERO
    };
    ctx.interpreter.next();
}

/// EIP-145: bitwise shifting instructions.
pub fn shl<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CONSTANTINOPLE);
    popn_top!([op1], op2, ctx);
    *op2 = if op1 < U256::from(256) {
        *op2 << op1.as_limbs()[0] as usize
    } else {
        U256::ZERO
    };
    ctx.interpreter.next();
}

pub fn shr<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CONSTANTINOPLE);
    popn_top!([op1], op2, ctx);
    *op2 = if op1 < U256::from(256) {
        *op2 >> op1.as_limbs()[0] as usize
    } else {
        U256::ZERO
    };
    ctx.interpreter.next();
}

pub fn sar<H: Host + ?Sized>(ctx: InstructionContext<'_, H>) {
    check!(ctx, CONSTANTINOPLE);
    popn_top!([op1], op2, ctx);
    let shift = if op1 < U256::from(256) {
        op1.as_limbs()[0] as usize
    } else {
        255
    };
    *op2 = op2.arithmetic_shr(shift);
    ctx.interpreter.next();
}

#[cfg(test)]
mod tests {
    use crate::instructions::testing::run_block;
    use primitives::U256;

    #[test]
    fn byte_indexing_is_big_endian() {
        // PUSH2 0xabcd, PUSH1 30, BYTE → 0xab
        let interp = run_block(&[0x61, 0xab, 0xcd, 0x60, 0x1e, 0x1a, 0x00]);
        assert_eq!(interp.stack.data(), &[U256::from(0xab)]);
    }

    #[test]
    fn sar_keeps_the_sign() {
        // PUSH32 -8, PUSH1 1, SAR → -4
        let mut code = vec![0x7f];
        code.extend_from_slice(&U256::MAX.wrapping_sub(U256::from(7)).to_be_bytes::<32>());
        code.extend_from_slice(&[0x60, 0x01, 0x1d, 0x00]);
        let interp = run_block(&code);
        assert_eq!(
            interp.stack.data(),
            &[U256::MAX.wrapping_sub(U256::from(3))]
        );
    }

    #[test]
    fn oversize_shift_is_zero() {
        // PUSH1 1, PUSH2 0x0101, SHL → 0
        let interp = run_block(&[0x60, 0x01, 0x61, 0x01, 0x01, 0x1b, 0x00]);
        assert_eq!(interp.stack.data(), &[U256::ZERO]);
    }
}
