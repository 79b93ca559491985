//! Duplication operations (16): DUP1..DUP16.
#![allow(unsafe_code)]

use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::vm::VM;

impl<T: Tracer> VM<T> {
    pub fn op_dup(&mut self, frame: &mut CallFrame, depth: usize) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::DUPN);

        // SAFETY: dispatch verified `depth` values below the top and room
        // for one more, per the opcode table.
        unsafe { frame.stack.dup_unchecked(depth) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}
