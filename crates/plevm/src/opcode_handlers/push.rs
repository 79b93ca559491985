//! Push operations: PUSH0 plus the planner's two lowered forms of
//! PUSH1..PUSH32 (inline immediate or constants-pool pointer).
use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::plan::Plan;
use crate::tracer::Tracer;
use crate::vm::VM;
use ethereum_types::U256;

impl<T: Tracer> VM<T> {
    pub fn op_push0(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSH0);

        frame.stack.push(U256::zero())?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    /// PUSH whose immediate fit into the operand element.
    pub fn op_push_inline(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN);

        let immediate = plan.operand(frame.index.wrapping_add(1))?;
        frame.stack.push(U256::from(immediate))?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }

    /// PUSH routed through the constants pool.
    pub fn op_push_pointer(
        &mut self,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PUSHN);

        let pool_index = plan.operand(frame.index.wrapping_add(1))?;
        frame.stack.push(plan.constant(pool_index)?)?;

        frame.advance(2);
        Ok(OpcodeSuccess::Continue)
    }
}
