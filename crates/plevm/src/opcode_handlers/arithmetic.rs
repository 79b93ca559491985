//! Arithmetic operations (11): ADD, MUL, SUB, DIV, SDIV, MOD, SMOD, ADDMOD,
//! MULMOD, EXP, SIGNEXTEND.
//!
//! These are the hottest pure-stack handlers, so they use the unchecked
//! stack variants; the dispatch loop has already verified the required
//! depth against the opcode table before any of them runs.
#![allow(unsafe_code)]

use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::vm::VM;
use ethereum_types::{U256, U512};

impl<T: Tracer> VM<T> {
    pub fn op_add(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::ADD);

        // SAFETY: dispatch checked for two operands.
        let (augend, addend) = unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let sum = augend.overflowing_add(addend).0;
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(sum) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sub(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SUB);

        // SAFETY: dispatch checked for two operands.
        let (minuend, subtrahend) =
            unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let difference = minuend.overflowing_sub(subtrahend).0;
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(difference) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mul(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MUL);

        // SAFETY: dispatch checked for two operands.
        let (multiplicand, multiplier) =
            unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let product = multiplicand.overflowing_mul(multiplier).0;
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(product) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_div(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::DIV);

        // SAFETY: dispatch checked for two operands.
        let (dividend, divisor) = unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let quotient = dividend.checked_div(divisor).unwrap_or_default();
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(quotient) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sdiv(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SDIV);

        // SAFETY: dispatch checked for two operands.
        let (dividend, divisor) = unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let quotient = signed_div(dividend, divisor);
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(quotient) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mod(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MOD);

        // SAFETY: dispatch checked for two operands.
        let (dividend, divisor) = unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let remainder = dividend.checked_rem(divisor).unwrap_or_default();
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(remainder) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_smod(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SMOD);

        // SAFETY: dispatch checked for two operands.
        let (dividend, divisor) = unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        let remainder = signed_rem(dividend, divisor);
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(remainder) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_addmod(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::ADDMOD);

        // SAFETY: dispatch checked for three operands.
        let (augend, addend, modulus) = unsafe {
            (
                frame.stack.pop_unchecked(),
                frame.stack.pop_unchecked(),
                frame.stack.pop_unchecked(),
            )
        };
        // The sum is formed in 512 bits, so the reduction sees the exact
        // value even when a + b wraps 256 bits.
        let result = if modulus.is_zero() {
            U256::zero()
        } else {
            let sum = U512::from(augend).overflowing_add(U512::from(addend)).0;
            truncate_u512(sum.checked_rem(U512::from(modulus)).unwrap_or_default())
        };
        // SAFETY: the three pops left room for the result.
        unsafe { frame.stack.push_unchecked(result) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mulmod(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MULMOD);

        // SAFETY: dispatch checked for three operands.
        let (multiplicand, multiplier, modulus) = unsafe {
            (
                frame.stack.pop_unchecked(),
                frame.stack.pop_unchecked(),
                frame.stack.pop_unchecked(),
            )
        };
        let result = if modulus.is_zero() {
            U256::zero()
        } else {
            let product = U512::from(multiplicand)
                .overflowing_mul(U512::from(multiplier))
                .0;
            truncate_u512(product.checked_rem(U512::from(modulus)).unwrap_or_default())
        };
        // SAFETY: the three pops left room for the result.
        unsafe { frame.stack.push_unchecked(result) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_exp(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::EXP_STATIC);

        // SAFETY: dispatch checked for two operands.
        let (base, exponent) = unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };
        frame.charge_dynamic(gas_cost::exp_dynamic_gas(exponent))?;

        let power = base.overflowing_pow(exponent).0;
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(power) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_signextend(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SIGNEXTEND);

        // SAFETY: dispatch checked for two operands.
        let (byte_size, value_to_extend) =
            unsafe { (frame.stack.pop_unchecked(), frame.stack.pop_unchecked()) };

        // For byte_size >= 31 every bit is already significant.
        let result = if byte_size >= U256::from(31) {
            value_to_extend
        } else {
            let sign_bit_index = byte_size
                .low_u64()
                .wrapping_mul(8)
                .wrapping_add(7);
            let sign_bit_index = usize::try_from(sign_bit_index).unwrap_or(255);
            if value_to_extend.bit(sign_bit_index) {
                let mask = (U256::one() << sign_bit_index)
                    .overflowing_sub(U256::one())
                    .0
                    | (U256::one() << sign_bit_index);
                value_to_extend | !mask
            } else {
                let mask = (U256::one() << sign_bit_index.wrapping_add(1))
                    .overflowing_sub(U256::one())
                    .0;
                value_to_extend & mask
            }
        };
        // SAFETY: the two pops left room for the result.
        unsafe { frame.stack.push_unchecked(result) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}

/// Most significant bit set means negative in two's complement.
pub fn is_negative(value: U256) -> bool {
    value.bit(255)
}

/// Two's-complement negation.
pub fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

/// Two's-complement division. MIN / -1 wraps back to MIN; anything over
/// zero is zero.
fn signed_div(dividend: U256, divisor: U256) -> U256 {
    if divisor.is_zero() || dividend.is_zero() {
        return U256::zero();
    }
    let quotient = abs(dividend).checked_div(abs(divisor)).unwrap_or_default();
    if is_negative(dividend) == is_negative(divisor) {
        quotient
    } else {
        negate(quotient)
    }
}

/// Two's-complement remainder; the sign follows the dividend.
fn signed_rem(dividend: U256, divisor: U256) -> U256 {
    if divisor.is_zero() || dividend.is_zero() {
        return U256::zero();
    }
    let remainder = abs(dividend).checked_rem(abs(divisor)).unwrap_or_default();
    if is_negative(dividend) {
        negate(remainder)
    } else {
        remainder
    }
}

/// Low 256 bits of a reduced 512-bit value; the modulus guarantees they are
/// the only ones set.
fn truncate_u512(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    U256::from_big_endian(bytes.get(32..).unwrap_or_default())
}
