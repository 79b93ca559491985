//! Comparison and bitwise logic operations (14): LT, GT, SLT, SGT, EQ,
//! ISZERO, AND, OR, XOR, NOT, BYTE, SHL, SHR, SAR.
use crate::call_frame::CallFrame;
use crate::constants::WORD_SIZE;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::opcode_handlers::arithmetic::is_negative;
use crate::tracer::Tracer;
use crate::vm::VM;
use ethereum_types::U256;

fn bool_to_word(condition: bool) -> U256 {
    if condition {
        U256::one()
    } else {
        U256::zero()
    }
}

impl<T: Tracer> VM<T> {
    pub fn op_lt(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::LT);

        let lho = frame.stack.pop()?;
        let rho = frame.stack.pop()?;
        frame.stack.push(bool_to_word(lho < rho))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gt(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::GT);

        let lho = frame.stack.pop()?;
        let rho = frame.stack.pop()?;
        frame.stack.push(bool_to_word(lho > rho))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_slt(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SLT);

        let lho = frame.stack.pop()?;
        let rho = frame.stack.pop()?;
        let result = if is_negative(lho) == is_negative(rho) {
            // Same sign: the unsigned order is the signed order.
            bool_to_word(lho < rho)
        } else {
            bool_to_word(is_negative(lho))
        };
        frame.stack.push(result)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sgt(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SGT);

        let lho = frame.stack.pop()?;
        let rho = frame.stack.pop()?;
        let result = if is_negative(lho) == is_negative(rho) {
            bool_to_word(lho > rho)
        } else {
            bool_to_word(is_negative(rho))
        };
        frame.stack.push(result)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_eq(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::EQ);

        let lho = frame.stack.pop()?;
        let rho = frame.stack.pop()?;
        frame.stack.push(bool_to_word(lho == rho))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_iszero(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::ISZERO);

        let operand = *frame.stack.peek()?;
        frame.stack.set_top(bool_to_word(operand.is_zero()))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_and(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::AND);

        let a = frame.stack.pop()?;
        let b = frame.stack.pop()?;
        frame.stack.push(a & b)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_or(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::OR);

        let a = frame.stack.pop()?;
        let b = frame.stack.pop()?;
        frame.stack.push(a | b)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_xor(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::XOR);

        let a = frame.stack.pop()?;
        let b = frame.stack.pop()?;
        frame.stack.push(a ^ b)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_not(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::NOT);

        let a = *frame.stack.peek()?;
        frame.stack.set_top(!a)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_byte(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::BYTE);

        let byte_index = frame.stack.pop()?;
        let value = frame.stack.pop()?;
        let byte_index = usize::try_from(byte_index).unwrap_or(usize::MAX);
        let result = if byte_index < WORD_SIZE {
            // U256::byte indexes from the little end.
            U256::from(value.byte(WORD_SIZE.wrapping_sub(1).wrapping_sub(byte_index)))
        } else {
            U256::zero()
        };
        frame.stack.push(result)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_shl(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SHL);

        let shift = frame.stack.pop()?;
        let value = frame.stack.pop()?;
        let result = if shift < U256::from(256) {
            value << usize::try_from(shift).unwrap_or_default()
        } else {
            U256::zero()
        };
        frame.stack.push(result)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_shr(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SHR);

        let shift = frame.stack.pop()?;
        let value = frame.stack.pop()?;
        let result = if shift < U256::from(256) {
            value >> usize::try_from(shift).unwrap_or_default()
        } else {
            U256::zero()
        };
        frame.stack.push(result)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sar(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SAR);

        let shift = frame.stack.pop()?;
        let value = frame.stack.pop()?;
        let result = if shift < U256::from(256) {
            arithmetic_shift_right(value, usize::try_from(shift).unwrap_or_default())
        } else if is_negative(value) {
            U256::MAX
        } else {
            U256::zero()
        };
        frame.stack.push(result)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}

/// Right shift that drags the sign bit along, for shifts below 256.
fn arithmetic_shift_right(value: U256, shift: usize) -> U256 {
    let shifted = value >> shift;
    if is_negative(value) && shift > 0 {
        let mask = U256::MAX << (256usize.wrapping_sub(shift));
        shifted | mask
    } else {
        shifted
    }
}
