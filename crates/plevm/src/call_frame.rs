use crate::code::Bytecode;
use crate::errors::VMError;
use crate::memory::Memory;
use crate::stack::Stack;
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use serde::Serialize;

/// An event emitted by LOG0..LOG4, accumulated on the frame and handed to
/// the host in the execution report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
}

/// Per-execution state: everything a single run over one plan mutates. The
/// frame owns its bytecode artifact, stack and memory; the plan it executes
/// lives outside and outlives it.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Gas budget for this frame, clamped to what the signed counter can
    /// represent.
    pub gas_limit: u64,
    /// Remaining gas. Signed so an unchecked base-gas subtract can be
    /// caught by the next check instead of wrapping.
    pub gas_remaining: i64,
    /// Current instruction-stream index.
    pub index: usize,
    /// Address of the account that sent the message.
    pub msg_sender: Address,
    /// Address of the recipient of the message.
    pub to: Address,
    /// Address of the code being executed. Usually `to`.
    pub code_address: Address,
    /// Validated bytecode artifact, with its position bitmaps.
    pub code: Bytecode,
    /// Value sent along with the message.
    pub msg_value: U256,
    pub stack: Stack,
    pub memory: Memory,
    pub calldata: Bytes,
    /// Data returned by this frame through RETURN or REVERT.
    pub output: Bytes,
    /// Return buffer of the most recent sub-call.
    pub sub_return_data: Bytes,
    /// Static frames may not mutate state.
    pub is_static: bool,
    /// Initcode frames pay the EIP-3860 word gas up front.
    pub is_initcode: bool,
    pub logs: Vec<Log>,
}

impl CallFrame {
    pub fn new(code: Bytecode, gas_limit: u64) -> Self {
        let clamped_limit = gas_limit.min(u64::try_from(i64::MAX).unwrap_or(u64::MAX));
        Self {
            gas_limit: clamped_limit,
            gas_remaining: i64::try_from(clamped_limit).unwrap_or(i64::MAX),
            index: 0,
            msg_sender: Address::default(),
            to: Address::default(),
            code_address: Address::default(),
            code,
            msg_value: U256::zero(),
            stack: Stack::new(),
            memory: Memory::new(),
            calldata: Bytes::new(),
            output: Bytes::new(),
            sub_return_data: Bytes::new(),
            is_static: false,
            is_initcode: false,
            logs: Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_with_context(
        code: Bytecode,
        gas_limit: u64,
        msg_sender: Address,
        to: Address,
        code_address: Address,
        msg_value: U256,
        calldata: Bytes,
        is_static: bool,
    ) -> Self {
        Self {
            msg_sender,
            to,
            code_address,
            msg_value,
            calldata,
            is_static,
            ..Self::new(code, gas_limit)
        }
    }

    /// Gas spent so far.
    pub fn gas_used(&self) -> u64 {
        let remaining = u64::try_from(self.gas_remaining).unwrap_or(0);
        self.gas_limit.saturating_sub(remaining)
    }

    /// Unchecked base-gas subtract; covered by the block-entry check.
    pub fn charge_base(&mut self, amount: u64) {
        let amount = i64::try_from(amount).unwrap_or(i64::MAX);
        self.gas_remaining = self.gas_remaining.wrapping_sub(amount);
    }

    /// Checked subtract for dynamic costs (memory expansion, copies,
    /// storage, logs).
    pub fn charge_dynamic(&mut self, amount: u64) -> Result<(), VMError> {
        let amount = i64::try_from(amount).map_err(|_| VMError::OutOfGas)?;
        if self.gas_remaining < amount {
            return Err(VMError::OutOfGas);
        }
        self.gas_remaining = self.gas_remaining.wrapping_sub(amount);
        Ok(())
    }

    /// Block-entry verification: the whole block's static base gas must be
    /// available before its handlers start subtracting unchecked.
    pub fn check_block_gas(&self, block_gas: u64) -> Result<(), VMError> {
        let needed = i64::try_from(block_gas).map_err(|_| VMError::OutOfGas)?;
        if self.gas_remaining < needed {
            return Err(VMError::OutOfGas);
        }
        Ok(())
    }

    /// Final verification on the terminal opcodes: the unchecked base-gas
    /// subtracts must not have driven the counter negative.
    pub fn terminal_gas_check(&self) -> Result<(), VMError> {
        if self.gas_remaining < 0 {
            return Err(VMError::OutOfGas);
        }
        Ok(())
    }

    /// Move past the current instruction's elements.
    pub fn advance(&mut self, elements: usize) {
        self.index = self.index.saturating_add(elements);
    }
}
