//! Logging operations (5): LOG0..LOG4.
use crate::call_frame::{CallFrame, Log};
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::utils::{u256_to_usize, word_to_h256};
use crate::vm::VM;
use bytes::Bytes;

impl<T: Tracer> VM<T> {
    pub fn op_log(
        &mut self,
        frame: &mut CallFrame,
        topic_count: usize,
    ) -> Result<OpcodeSuccess, VMError> {
        if frame.is_static {
            return Err(VMError::WriteProtection);
        }
        frame.charge_base(gas_cost::LOGN_STATIC);

        let offset = frame.stack.pop()?;
        let size = u256_to_usize(frame.stack.pop()?)?;
        let offset = if size == 0 { 0 } else { u256_to_usize(offset)? };

        let mut topics = Vec::with_capacity(topic_count);
        for _ in 0..topic_count {
            topics.push(word_to_h256(frame.stack.pop()?));
        }

        frame.charge_dynamic(gas_cost::log_dynamic_gas(
            &frame.memory,
            offset,
            size,
            u64::try_from(topic_count).unwrap_or_default(),
        )?)?;

        let data = frame.memory.load_range(offset, size)?;
        frame.logs.push(Log {
            address: frame.to,
            topics,
            data: Bytes::from(data),
        });

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}
