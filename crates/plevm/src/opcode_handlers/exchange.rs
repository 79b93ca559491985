//! Exchange operations (16): SWAP1..SWAP16.
#![allow(unsafe_code)]

use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::vm::VM;

impl<T: Tracer> VM<T> {
    pub fn op_swap(&mut self, frame: &mut CallFrame, depth: usize) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SWAPN);

        // SAFETY: dispatch verified `depth + 1` values are present, per the
        // opcode table.
        unsafe { frame.stack.swap_unchecked(depth) };

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}
