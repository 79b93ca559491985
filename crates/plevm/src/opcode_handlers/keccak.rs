//! KECCAK256 (1).
use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::utils::{keccak256_digest, u256_to_usize};
use crate::vm::VM;

impl<T: Tracer> VM<T> {
    pub fn op_keccak256(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::KECCAK256_STATIC);

        let offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let offset = if size == 0 { 0 } else { u256_to_usize(offset)? };

        frame.charge_dynamic(gas_cost::keccak256_dynamic_gas(&frame.memory, offset, size)?)?;

        let data = frame.memory.load_range(offset, size)?;
        frame.stack.push(keccak256_digest(&data))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}
