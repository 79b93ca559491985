use ethereum_types::{Address, H256, U256};
use std::collections::HashMap;

/// Transaction- and block-level context served to the environmental and
/// block-information opcodes. The engine never derives these values; the
/// host supplies them at frame creation.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    /// Sender of the transaction that originated this execution.
    pub origin: Address,
    pub gas_price: U256,
    pub block_number: U256,
    pub coinbase: Address,
    pub timestamp: U256,
    pub prev_randao: H256,
    pub block_gas_limit: U256,
    pub chain_id: U256,
    pub base_fee_per_gas: U256,
    pub blob_base_fee: U256,
    pub tx_blob_hashes: Vec<H256>,
    /// Balance of the executing account; other accounts are observed empty.
    pub self_balance: U256,
    /// Hashes for the most recent blocks, keyed by block number.
    pub block_hashes: HashMap<u64, H256>,
}

impl Environment {
    pub fn default_from_address(origin: Address) -> Self {
        Self {
            origin,
            chain_id: U256::one(),
            ..Default::default()
        }
    }

    /// Hash of a recent block, zero outside the 256-block window.
    pub fn block_hash(&self, number: U256) -> H256 {
        use crate::constants::LAST_AVAILABLE_BLOCK_LIMIT;
        if number >= self.block_number {
            return H256::zero();
        }
        let age = self.block_number.saturating_sub(number);
        if age > U256::from(LAST_AVAILABLE_BLOCK_LIMIT) {
            return H256::zero();
        }
        u64::try_from(number)
            .ok()
            .and_then(|number| self.block_hashes.get(&number).copied())
            .unwrap_or_default()
    }
}
