//! System operations: the terminal opcodes (STOP, RETURN, REVERT, INVALID,
//! SELFDESTRUCT) and the call/create family.
//!
//! No sub-frame orchestration happens here: the call and create opcodes pop
//! their documented operands, charge gas, and report failure (push 0), the
//! deterministic result of calling into an absent world. Static-context
//! violations still trap as usual.
use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, ResultReason, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::utils::{u256_to_usize, word_to_address};
use crate::vm::VM;
use bytes::Bytes;
use ethereum_types::U256;

impl<T: Tracer> VM<T> {
    pub fn op_stop(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.terminal_gas_check()?;
        Ok(OpcodeSuccess::Result(ResultReason::Stop))
    }

    pub fn op_return(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.read_output(frame)?;
        frame.terminal_gas_check()?;
        Ok(OpcodeSuccess::Result(ResultReason::Return))
    }

    pub fn op_revert(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.read_output(frame)?;
        frame.terminal_gas_check()?;
        Ok(OpcodeSuccess::Result(ResultReason::Revert))
    }

    fn read_output(&mut self, frame: &mut CallFrame) -> Result<(), VMError> {
        let offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let offset = if size == 0 { 0 } else { u256_to_usize(offset)? };

        let end = offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        frame.charge_dynamic(frame.memory.expansion_cost(end)?)?;

        frame.output = Bytes::from(frame.memory.load_range(offset, size)?);
        Ok(())
    }

    /// 0xFE: always traps and consumes whatever gas was left.
    pub fn op_invalid(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.gas_remaining = 0;
        Err(VMError::InvalidOpcode)
    }

    pub fn op_selfdestruct(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        if frame.is_static {
            return Err(VMError::WriteProtection);
        }
        frame.charge_base(gas_cost::SELFDESTRUCT_STATIC);

        let beneficiary = word_to_address(frame.stack.pop()?);
        self.substate.selfdestructs.push((frame.to, beneficiary));

        frame.terminal_gas_check()?;
        Ok(OpcodeSuccess::Result(ResultReason::SelfDestruct))
    }

    pub fn op_create(
        &mut self,
        frame: &mut CallFrame,
        is_create2: bool,
    ) -> Result<OpcodeSuccess, VMError> {
        if frame.is_static {
            return Err(VMError::WriteProtection);
        }
        frame.charge_base(gas_cost::CREATE_BASE);

        let _value = frame.stack.pop()?;
        let offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        if is_create2 {
            let _salt = frame.stack.pop()?;
        }
        let offset = if size == 0 { 0 } else { u256_to_usize(offset)? };

        let end = offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        let expansion = frame.memory.expansion_cost(end)?;
        let init_words = gas_cost::init_code_word_gas(size);
        frame.charge_dynamic(expansion.saturating_add(init_words))?;
        frame.memory.expand(offset, size)?;

        // Nothing is deployed; report creation failure.
        frame.sub_return_data = Bytes::new();
        frame.stack.push(U256::zero())?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_call(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.call_stub(frame, true)
    }

    pub fn op_callcode(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.call_stub(frame, true)
    }

    pub fn op_delegatecall(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.call_stub(frame, false)
    }

    pub fn op_staticcall(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        self.call_stub(frame, false)
    }

    fn call_stub(&mut self, frame: &mut CallFrame, has_value: bool) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CALL_BASE);

        let _gas = frame.stack.pop()?;
        let _address = word_to_address(frame.stack.pop()?);
        if has_value {
            let value = frame.stack.pop()?;
            if frame.is_static && !value.is_zero() {
                return Err(VMError::WriteProtection);
            }
        }
        let args_offset = frame.stack.pop()?;
        let args_size = u256_to_usize(frame.stack.pop()?)?;
        let ret_offset = frame.stack.pop()?;
        let ret_size = u256_to_usize(frame.stack.pop()?)?;

        let args_expansion = range_expansion(frame, args_offset, args_size)?;
        let ret_expansion = range_expansion(frame, ret_offset, ret_size)?;
        frame.charge_dynamic(args_expansion.max(ret_expansion))?;
        if args_size > 0 {
            frame.memory.expand(u256_to_usize(args_offset)?, args_size)?;
        }
        if ret_size > 0 {
            frame.memory.expand(u256_to_usize(ret_offset)?, ret_size)?;
        }

        // The callee does not exist: empty return buffer, failure result.
        frame.sub_return_data = Bytes::new();
        frame.stack.push(U256::zero())?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}

fn range_expansion(frame: &CallFrame, offset: U256, size: usize) -> Result<u64, VMError> {
    if size == 0 {
        return Ok(0);
    }
    let offset = u256_to_usize(offset)?;
    let end = offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
    frame.memory.expansion_cost(end)
}
