//! Environmental information opcodes (0x30..0x3F). Account-level queries
//! observe the executing account and otherwise empty accounts; world state
//! beyond the storage interface belongs to the host.
use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::utils::{address_to_word, copy_padded, keccak256_digest, u256_to_usize, word_to_address};
use crate::vm::VM;
use ethereum_types::U256;

impl<T: Tracer> VM<T> {
    pub fn op_address(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::ADDRESS);
        frame.stack.push(address_to_word(frame.to))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_balance(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::BALANCE);

        let address = word_to_address(frame.stack.pop()?);
        let balance = if address == frame.to {
            self.env.self_balance
        } else {
            U256::zero()
        };
        frame.stack.push(balance)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_origin(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::ORIGIN);
        frame.stack.push(address_to_word(self.env.origin))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_caller(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CALLER);
        frame.stack.push(address_to_word(frame.msg_sender))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_callvalue(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CALLVALUE);
        frame.stack.push(frame.msg_value)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_calldataload(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CALLDATALOAD);

        let offset = frame.stack.pop()?;
        let word = copy_padded(&frame.calldata, offset, 32);
        frame.stack.push(U256::from_big_endian(&word))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_calldatasize(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CALLDATASIZE);
        frame.stack.push(U256::from(frame.calldata.len()))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_calldatacopy(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CALLDATACOPY_STATIC);

        let dest_offset = frame.stack.pop()?;
        let data_offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let dest_offset = if size == 0 { 0 } else { u256_to_usize(dest_offset)? };

        frame.charge_dynamic(gas_cost::calldatacopy_dynamic_gas(
            &frame.memory,
            dest_offset,
            size,
        )?)?;

        let data = copy_padded(&frame.calldata, data_offset, size);
        frame.memory.store_range(dest_offset, &data)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_codesize(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CODESIZE);
        frame.stack.push(U256::from(frame.code.len()))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_codecopy(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CODECOPY_STATIC);

        let dest_offset = frame.stack.pop()?;
        let code_offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let dest_offset = if size == 0 { 0 } else { u256_to_usize(dest_offset)? };

        frame.charge_dynamic(gas_cost::codecopy_dynamic_gas(
            &frame.memory,
            dest_offset,
            size,
        )?)?;

        let data = copy_padded(frame.code.bytes(), code_offset, size);
        frame.memory.store_range(dest_offset, &data)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gasprice(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::GASPRICE);
        frame.stack.push(self.env.gas_price)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_extcodesize(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::EXTCODESIZE);

        let address = word_to_address(frame.stack.pop()?);
        let size = if address == frame.to {
            frame.code.len()
        } else {
            0
        };
        frame.stack.push(U256::from(size))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_extcodecopy(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::EXTCODECOPY_STATIC);

        let address = word_to_address(frame.stack.pop()?);
        let dest_offset = frame.stack.pop()?;
        let code_offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let dest_offset = if size == 0 { 0 } else { u256_to_usize(dest_offset)? };

        frame.charge_dynamic(gas_cost::extcodecopy_dynamic_gas(
            &frame.memory,
            dest_offset,
            size,
        )?)?;

        let source = if address == frame.to {
            frame.code.bytes().clone()
        } else {
            bytes::Bytes::new()
        };
        let data = copy_padded(&source, code_offset, size);
        frame.memory.store_range(dest_offset, &data)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_returndatasize(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::RETURNDATASIZE);
        frame.stack.push(U256::from(frame.sub_return_data.len()))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_returndatacopy(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::RETURNDATACOPY_STATIC);

        let dest_offset = frame.stack.pop()?;
        let data_offset = u256_to_usize(frame.stack.pop()?)?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let dest_offset = if size == 0 { 0 } else { u256_to_usize(dest_offset)? };

        // Unlike the other copies, reading past the return buffer traps.
        let end = data_offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        if end > frame.sub_return_data.len() {
            return Err(VMError::OutOfBounds);
        }

        frame.charge_dynamic(gas_cost::returndatacopy_dynamic_gas(
            &frame.memory,
            dest_offset,
            size,
        )?)?;

        let data = frame
            .sub_return_data
            .get(data_offset..end)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        frame.memory.store_range(dest_offset, &data)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_extcodehash(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::EXTCODEHASH);

        let address = word_to_address(frame.stack.pop()?);
        // Non-existent accounts hash to zero.
        let hash = if address == frame.to {
            keccak256_digest(frame.code.bytes())
        } else {
            U256::zero()
        };
        frame.stack.push(hash)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}
