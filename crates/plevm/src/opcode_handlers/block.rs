//! Block information opcodes (0x40..0x4A), answered from the Environment
//! the host supplied at frame creation.
use crate::call_frame::CallFrame;
use crate::errors::{OpcodeSuccess, VMError};
use crate::gas_cost;
use crate::tracer::Tracer;
use crate::utils::address_to_word;
use crate::vm::VM;
use ethereum_types::U256;

impl<T: Tracer> VM<T> {
    pub fn op_blockhash(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::BLOCKHASH);

        let number = frame.stack.pop()?;
        let hash = self.env.block_hash(number);
        frame.stack.push(U256::from_big_endian(hash.as_bytes()))?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_coinbase(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::COINBASE);
        frame.stack.push(address_to_word(self.env.coinbase))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_timestamp(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::TIMESTAMP);
        frame.stack.push(self.env.timestamp)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_number(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::NUMBER);
        frame.stack.push(self.env.block_number)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_prevrandao(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::PREVRANDAO);
        frame
            .stack
            .push(U256::from_big_endian(self.env.prev_randao.as_bytes()))?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_gaslimit(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::GASLIMIT);
        frame.stack.push(self.env.block_gas_limit)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_chainid(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::CHAINID);
        frame.stack.push(self.env.chain_id)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_selfbalance(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::SELFBALANCE);
        frame.stack.push(self.env.self_balance)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_basefee(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::BASEFEE);
        frame.stack.push(self.env.base_fee_per_gas)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_blobhash(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::BLOBHASH);

        let index = frame.stack.pop()?;
        let hash = usize::try_from(index)
            .ok()
            .and_then(|index| self.env.tx_blob_hashes.get(index))
            .map(|hash| U256::from_big_endian(hash.as_bytes()))
            .unwrap_or_default();
        frame.stack.push(hash)?;

        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }

    pub fn op_blobbasefee(&mut self, frame: &mut CallFrame) -> Result<OpcodeSuccess, VMError> {
        frame.charge_base(gas_cost::BLOBBASEFEE);
        frame.stack.push(self.env.blob_base_fee)?;
        frame.advance(1);
        Ok(OpcodeSuccess::Continue)
    }
}
