use crate::call_frame::CallFrame;
use crate::code::Bytecode;
use crate::constants::WORD_SIZE;
use crate::db::InMemoryDb;
use crate::environment::Environment;
use crate::errors::VMError;
use crate::operations::Operation;
use crate::plan::Plan;
use crate::planner::{Planner, PlannerConfig};
use crate::vm::VM;
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use sha3::{Digest, Keccak256};

/// Default budget for frames built by the test constructors.
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

pub fn address_to_word(address: Address) -> U256 {
    let mut word = [0u8; WORD_SIZE];
    for (word_byte, address_byte) in word.iter_mut().skip(12).zip(address.as_bytes().iter()) {
        *word_byte = *address_byte;
    }
    U256::from_big_endian(&word)
}

pub fn word_to_address(word: U256) -> Address {
    let mut bytes = [0u8; WORD_SIZE];
    word.to_big_endian(&mut bytes);
    Address::from_slice(bytes.get(12..).unwrap_or_default())
}

pub fn word_to_h256(word: U256) -> H256 {
    let mut bytes = [0u8; WORD_SIZE];
    word.to_big_endian(&mut bytes);
    H256::from(bytes)
}

/// Stack words used as memory offsets must fit the address space.
pub fn u256_to_usize(value: U256) -> Result<usize, VMError> {
    usize::try_from(value).map_err(|_| VMError::OutOfBounds)
}

pub fn keccak256_digest(data: &[u8]) -> U256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    U256::from_big_endian(&hasher.finalize())
}

/// Read `size` bytes starting at `src_offset`, zero-padding everything that
/// falls outside `source` (the CALLDATACOPY/CODECOPY padding rule).
pub fn copy_padded(source: &[u8], src_offset: U256, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    if let Ok(src_offset) = usize::try_from(src_offset) {
        for (i, byte) in out.iter_mut().enumerate() {
            if let Some(value) = src_offset.checked_add(i).and_then(|pos| source.get(pos)) {
                *byte = *value;
            }
        }
    }
    out
}

pub fn ops_to_bytecode(operations: &[Operation]) -> Bytes {
    operations
        .iter()
        .flat_map(Operation::to_bytecode)
        .collect::<Bytes>()
}

/// Validate, plan and wire up a VM over in-memory storage; the shape every
/// behavioral test starts from.
pub fn new_vm_with_ops(operations: &[Operation]) -> Result<(Plan, CallFrame, VM), VMError> {
    new_vm_with_bytecode(ops_to_bytecode(operations))
}

pub fn new_vm_with_bytecode(code: Bytes) -> Result<(Plan, CallFrame, VM), VMError> {
    new_vm_with_bytecode_and_config(code, PlannerConfig::default())
}

pub fn new_vm_with_bytecode_and_config(
    code: Bytes,
    config: PlannerConfig,
) -> Result<(Plan, CallFrame, VM), VMError> {
    let code = Bytecode::new(code)?;
    let plan = Planner::with_config(&code, config).plan()?;
    let frame = CallFrame::new(code, DEFAULT_GAS_LIMIT);
    let vm = VM::new(Environment::default(), Box::new(InMemoryDb::new()));
    Ok((plan, frame, vm))
}
