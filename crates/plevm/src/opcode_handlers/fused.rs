//! Handlers for the planner's synthetic opcodes: the block-entry gas check
//! and the fused PUSH+op pairs. The immediate always plays the role of the
//! pushed value, i.e. the top operand of the second instruction.
use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::plan::Plan;
use crate::tracer::Tracer;
use crate::vm::VM;
use ethereum_types::U256;

impl<T: Tracer> VM<T> {
    /// Entry of a basic block that does not start at a JUMPDEST; verifies
    /// the block's static base gas in one go.
    pub fn op_begin_block(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        let block_gas = plan.operand(frame.index.wrapping_add(1))?;
        frame.check_block_gas(u64::try_from(block_gas).unwrap_or(u64::MAX))?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_push_add(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::ADD));

        let immediate = U256::from(plan.operand(frame.index.wrapping_add(1))?);
        let addend = frame.stack.pop()?;
        frame.stack.push(immediate.overflowing_add(addend).0)?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_push_sub(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::SUB));

        let immediate = U256::from(plan.operand(frame.index.wrapping_add(1))?);
        let subtrahend = frame.stack.pop()?;
        frame.stack.push(immediate.overflowing_sub(subtrahend).0)?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_push_mul(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::MUL));

        let immediate = U256::from(plan.operand(frame.index.wrapping_add(1))?);
        let multiplier = frame.stack.pop()?;
        frame.stack.push(immediate.overflowing_mul(multiplier).0)?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_push_div(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::DIV));

        let immediate = U256::from(plan.operand(frame.index.wrapping_add(1))?);
        let divisor = frame.stack.pop()?;
        frame.stack.push(immediate.checked_div(divisor).unwrap_or_default())?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    /// Fused PUSH+JUMP whose target was resolved at plan time; the operand
    /// is the stream index of the destination JUMPDEST.
    pub fn op_push_jump(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::JUMP));

        frame.index = plan.operand(frame.index.wrapping_add(1))?;
        Ok(OpcodeSuccess::Continue)
    }

    /// Fused PUSH+JUMP whose constant target is no jump destination.
    pub fn op_push_jump_invalid(
        &mut self,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::JUMP));
        Err(VMError::InvalidJump)
    }

    pub fn op_push_jumpi(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::JUMPI));

        let condition = frame.stack.pop()?;
        if condition.is_zero() {
            frame.advance(2);
        } else {
            frame.index = plan.operand(frame.index.wrapping_add(1))?;
        }
        Ok(OpcodeSuccess::Continue)
    }

    /// Fused PUSH+JUMPI with an unresolvable target; only traps when the
    /// branch is actually taken.
    pub fn op_push_jumpi_invalid(
        &mut self,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN.saturating_add(gas_cost::JUMPI));

        let condition = frame.stack.pop()?;
        if condition.is_zero() {
            frame.advance(2);
            Ok(OpcodeSuccess::Continue)
        } else {
            Err(VMError::InvalidJump)
        }
    }
}
