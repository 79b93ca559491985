use ethereum_types::{Address, H256, U256};
use std::collections::HashMap;

/// The storage surface the host exposes to a frame. Calls are synchronous
/// and infallible; reads must observe earlier writes from the same frame.
/// Transient slots live only for the current transaction.
pub trait Database {
    fn get_storage(&self, address: Address, slot: H256) -> U256;
    fn set_storage(&mut self, address: Address, slot: H256, value: U256);
    fn get_transient_storage(&self, address: Address, slot: H256) -> U256;
    fn set_transient_storage(&mut self, address: Address, slot: H256, value: U256);
}

/// Map-backed storage for tests, the CLI runner and the embedding boundary.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDb {
    storage: HashMap<(Address, H256), U256>,
    transient: HashMap<(Address, H256), U256>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the per-transaction scratchpad, as the host does between
    /// transactions.
    pub fn clear_transient_storage(&mut self) {
        self.transient.clear();
    }

    pub fn storage_slots(&self) -> &HashMap<(Address, H256), U256> {
        &self.storage
    }
}

impl Database for InMemoryDb {
    fn get_storage(&self, address: Address, slot: H256) -> U256 {
        self.storage
            .get(&(address, slot))
            .copied()
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: Address, slot: H256, value: U256) {
        self.storage.insert((address, slot), value);
    }

    fn get_transient_storage(&self, address: Address, slot: H256) -> U256 {
        self.transient
            .get(&(address, slot))
            .copied()
            .unwrap_or_default()
    }

    fn set_transient_storage(&mut self, address: Address, slot: H256, value: U256) {
        self.transient.insert((address, slot), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_observe_earlier_writes() {
        let mut db = InMemoryDb::new();
        let address = Address::from_low_u64_be(7);
        let slot = H256::from_low_u64_be(1);
        assert!(db.get_storage(address, slot).is_zero());
        db.set_storage(address, slot, U256::from(99));
        assert_eq!(db.get_storage(address, slot), U256::from(99));
    }

    #[test]
    fn transient_storage_is_separate_and_clearable() {
        let mut db = InMemoryDb::new();
        let address = Address::from_low_u64_be(7);
        let slot = H256::from_low_u64_be(1);
        db.set_transient_storage(address, slot, U256::from(5));
        assert!(db.get_storage(address, slot).is_zero());
        db.clear_transient_storage();
        assert!(db.get_transient_storage(address, slot).is_zero());
    }
}
