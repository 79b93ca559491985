//! Stack, memory, storage and flow operations (15): POP, MLOAD, MSTORE,
//! MSTORE8, SLOAD, SSTORE, JUMP, JUMPI, PC, MSIZE, GAS, JUMPDEST, TLOAD,
//! TSTORE, MCOPY.
use crate::call_frame::CallFrame;
use crate::constants::WORD_SIZE;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::plan::Plan;
use crate::tracer::Tracer;
use crate::utils::{u256_to_usize, word_to_h256};
use crate::vm::VM;
use ethereum_types::U256;

impl<T: Tracer> VM<T> {
    pub fn op_pop(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::POP);
        frame.stack.pop()?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mload(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MLOAD_STATIC);

        let offset = u256_to_usize(frame.stack.pop()?)?;
        let end = offset.checked_add(WORD_SIZE).ok_or(VMError::OutOfBounds)?;
        frame.charge_dynamic(frame.memory.expansion_cost(end)?)?;

        let value = frame.memory.load_word(offset)?;
        frame.stack.push(value)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mstore(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MSTORE_STATIC);

        let offset = u256_to_usize(frame.stack.pop()?)?;
        let value = frame.stack.pop()?;
        let end = offset.checked_add(WORD_SIZE).ok_or(VMError::OutOfBounds)?;
        frame.charge_dynamic(frame.memory.expansion_cost(end)?)?;

        frame.memory.store_word(offset, value)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mstore8(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MSTORE8_STATIC);

        let offset = u256_to_usize(frame.stack.pop()?)?;
        let value = frame.stack.pop()?;
        let end = offset.checked_add(1).ok_or(VMError::OutOfBounds)?;
        frame.charge_dynamic(frame.memory.expansion_cost(end)?)?;

        frame.memory.store_byte(offset, value.byte(0))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sload(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SLOAD);

        let key = word_to_h256(frame.stack.pop()?);
        let value = self.db.get_storage(frame.to, key);
        frame.stack.push(value)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_sstore(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if frame.is_static {
            return Err(VMError::WriteProtection);
        }

        let key = word_to_h256(frame.stack.pop()?);
        let value = frame.stack.pop()?;

        let current_value = self.db.get_storage(frame.to, key);
        frame.charge_dynamic(gas_cost::sstore_dynamic_gas(current_value, value))?;

        self.db.set_storage(frame.to, key, value);

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_tload(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::TLOAD);

        let key = word_to_h256(frame.stack.pop()?);
        let value = self.db.get_transient_storage(frame.to, key);
        frame.stack.push(value)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_tstore(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if frame.is_static {
            return Err(VMError::WriteProtection);
        }
        frame.charge_base(gas_cost::TSTORE);

        let key = word_to_h256(frame.stack.pop()?);
        let value = frame.stack.pop()?;
        self.db.set_transient_storage(frame.to, key, value);

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_msize(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MSIZE);
        frame.stack.push(U256::from(frame.memory.size()))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gas(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::GAS);

        // What is left after paying for GAS itself.
        let remaining = u64::try_from(frame.gas_remaining).unwrap_or(0);
        frame.stack.push(U256::from(remaining))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_mcopy(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::MCOPY_STATIC);

        let dest_offset = frame.stack.pop()?;
        let src_offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let (dest_offset, src_offset) = if size == 0 {
            (0, 0)
        } else {
            (u256_to_usize(dest_offset)?, u256_to_usize(src_offset)?)
        };

        frame.charge_dynamic(gas_cost::mcopy_dynamic_gas(
            &frame.memory,
            dest_offset,
            src_offset,
            size,
        )?)?;

        frame.memory.copy(dest_offset, src_offset, size)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_jump(&mut self, plan: &Plan, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::JUMP);

        let target = frame.stack.pop()?;
        frame.index = resolve_jump(plan, target)?;

        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_jumpi(&mut self, plan: &Plan, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::JUMPI);

        let target = frame.stack.pop()?;
        let condition = frame.stack.pop()?;
        if condition.is_zero() {
            frame.advance(1);
        } else {
            frame.index = resolve_jump(plan, target)?;
        }

        Ok(OpcodeSuccess::Continue)
    }

    /// JUMPDEST heads a basic block; its operand carries the block's static
    /// base-gas sum, verified once so the block's handlers can subtract
    /// without checking.
    pub fn op_jumpdest(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        let block_gas = plan.operand(frame.index.wrapping_add(1))?;
        frame.check_block_gas(u64::try_from(block_gas).unwrap_or(u64::MAX))?;
        frame.charge_base(gas_cost::JUMPDEST);

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    /// The planner inlined the source offset next to the handler, so PC
    /// never consults the bytecode.
    pub fn op_pc(&mut self, plan: &Plan, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PC);

        let pc = plan.operand(frame.index.wrapping_add(1))?;
        frame.stack.push(U256::from(pc))?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }
}

/// A dynamic jump is valid iff its target PC maps to a JUMPDEST element.
fn resolve_jump(plan: &Plan, target: U256) -> Result<usize, VMError> {
    let target_pc = usize::try_from(target).map_err(|_| VMError::InvalidJump)?;
    plan.jump_target(target_pc).ok_or(VMError::InvalidJump)
}
