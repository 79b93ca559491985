//! Gas costs of the instruction set: flat base costs charged through the
//! planner's per-block sums, and the dynamic parts computed at the charging
//! site.
use crate::constants::WORD_SIZE;
use crate::errors::VMError;
use crate::memory::Memory;
use ethereum_types::U256;

pub const ADD: u64 = 3;
pub const MUL: u64 = 5;
pub const SUB: u64 = 3;
pub const DIV: u64 = 5;
pub const SDIV: u64 = 5;
pub const MOD: u64 = 5;
pub const SMOD: u64 = 5;
pub const ADDMOD: u64 = 8;
pub const MULMOD: u64 = 8;
pub const EXP_STATIC: u64 = 10;
pub const EXP_DYNAMIC_BASE: u64 = 50;
pub const SIGNEXTEND: u64 = 5;
pub const LT: u64 = 3;
pub const GT: u64 = 3;
pub const SLT: u64 = 3;
pub const SGT: u64 = 3;
pub const EQ: u64 = 3;
pub const ISZERO: u64 = 3;
pub const AND: u64 = 3;
pub const OR: u64 = 3;
pub const XOR: u64 = 3;
pub const NOT: u64 = 3;
pub const BYTE: u64 = 3;
pub const SHL: u64 = 3;
pub const SHR: u64 = 3;
pub const SAR: u64 = 3;
pub const KECCAK256_STATIC: u64 = 30;
pub const KECCAK256_DYNAMIC_BASE: u64 = 6;
pub const ADDRESS: u64 = 2;
pub const BALANCE: u64 = 100;
pub const ORIGIN: u64 = 2;
pub const CALLER: u64 = 2;
pub const CALLVALUE: u64 = 2;
pub const CALLDATALOAD: u64 = 3;
pub const CALLDATASIZE: u64 = 2;
pub const CALLDATACOPY_STATIC: u64 = 3;
pub const CALLDATACOPY_DYNAMIC_BASE: u64 = 3;
pub const CODESIZE: u64 = 2;
pub const CODECOPY_STATIC: u64 = 3;
pub const CODECOPY_DYNAMIC_BASE: u64 = 3;
pub const GASPRICE: u64 = 2;
pub const EXTCODESIZE: u64 = 100;
pub const EXTCODECOPY_STATIC: u64 = 100;
pub const EXTCODECOPY_DYNAMIC_BASE: u64 = 3;
pub const RETURNDATASIZE: u64 = 2;
pub const RETURNDATACOPY_STATIC: u64 = 3;
pub const RETURNDATACOPY_DYNAMIC_BASE: u64 = 3;
pub const EXTCODEHASH: u64 = 100;
pub const BLOCKHASH: u64 = 20;
pub const COINBASE: u64 = 2;
pub const TIMESTAMP: u64 = 2;
pub const NUMBER: u64 = 2;
pub const PREVRANDAO: u64 = 2;
pub const GASLIMIT: u64 = 2;
pub const CHAINID: u64 = 2;
pub const SELFBALANCE: u64 = 5;
pub const BASEFEE: u64 = 2;
pub const BLOBHASH: u64 = 3;
pub const BLOBBASEFEE: u64 = 2;
pub const POP: u64 = 2;
pub const MLOAD_STATIC: u64 = 3;
pub const MSTORE_STATIC: u64 = 3;
pub const MSTORE8_STATIC: u64 = 3;
pub const SLOAD: u64 = 100;
pub const SSTORE_NOOP: u64 = 100;
pub const SSTORE_CREATE_SLOT: u64 = 20000;
pub const SSTORE_MODIFY_SLOT: u64 = 5000;
pub const JUMP: u64 = 8;
pub const JUMPI: u64 = 10;
pub const PC: u64 = 2;
pub const MSIZE: u64 = 2;
pub const GAS: u64 = 2;
pub const JUMPDEST: u64 = 1;
pub const TLOAD: u64 = 100;
pub const TSTORE: u64 = 100;
pub const MCOPY_STATIC: u64 = 3;
pub const MCOPY_DYNAMIC_BASE: u64 = 3;
pub const PUSH0: u64 = 2;
pub const PUSHN: u64 = 3;
pub const DUPN: u64 = 3;
pub const SWAPN: u64 = 3;
pub const LOGN_STATIC: u64 = 375;
pub const LOGN_DYNAMIC_BASE: u64 = 375;
pub const LOGN_DYNAMIC_BYTE_BASE: u64 = 8;
pub const CALL_BASE: u64 = 100;
pub const CREATE_BASE: u64 = 32000;
pub const SELFDESTRUCT_STATIC: u64 = 5000;
pub const INIT_CODE_WORD_COST: u64 = 2;

/// Number of 32-byte words needed to hold `size` bytes.
pub fn word_count(size: usize) -> u64 {
    let size = u64::try_from(size).unwrap_or(u64::MAX);
    size.div_ceil(u64::try_from(WORD_SIZE).unwrap_or(32))
}

/// EIP-3860: 2 gas per 32-byte word of initcode, rounded up.
pub fn init_code_word_gas(init_code_len: usize) -> u64 {
    word_count(init_code_len).saturating_mul(INIT_CODE_WORD_COST)
}

/// Dynamic part of EXP: 50 per significant byte of the exponent.
pub fn exp_dynamic_gas(exponent: U256) -> u64 {
    let exponent_byte_size = u64::try_from(exponent.bits()).unwrap_or(u64::MAX).div_ceil(8);
    EXP_DYNAMIC_BASE.saturating_mul(exponent_byte_size)
}

fn expansion_for(memory: &Memory, offset: usize, size: usize) -> Result<u64, VMError> {
    if size == 0 {
        return Ok(0);
    }
    let end = offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
    memory.expansion_cost(end)
}

fn copy_dynamic_gas(
    memory: &Memory,
    dest_offset: usize,
    size: usize,
    word_base: u64,
) -> Result<u64, VMError> {
    let word_cost = word_base.saturating_mul(word_count(size));
    let memory_expansion_cost = expansion_for(memory, dest_offset, size)?;
    word_cost
        .checked_add(memory_expansion_cost)
        .ok_or(VMError::OutOfGas)
}

pub fn keccak256_dynamic_gas(memory: &Memory, offset: usize, size: usize) -> Result<u64, VMError> {
    copy_dynamic_gas(memory, offset, size, KECCAK256_DYNAMIC_BASE)
}

pub fn calldatacopy_dynamic_gas(
    memory: &Memory,
    dest_offset: usize,
    size: usize,
) -> Result<u64, VMError> {
    copy_dynamic_gas(memory, dest_offset, size, CALLDATACOPY_DYNAMIC_BASE)
}

pub fn codecopy_dynamic_gas(
    memory: &Memory,
    dest_offset: usize,
    size: usize,
) -> Result<u64, VMError> {
    copy_dynamic_gas(memory, dest_offset, size, CODECOPY_DYNAMIC_BASE)
}

pub fn extcodecopy_dynamic_gas(
    memory: &Memory,
    dest_offset: usize,
    size: usize,
) -> Result<u64, VMError> {
    copy_dynamic_gas(memory, dest_offset, size, EXTCODECOPY_DYNAMIC_BASE)
}

pub fn returndatacopy_dynamic_gas(
    memory: &Memory,
    dest_offset: usize,
    size: usize,
) -> Result<u64, VMError> {
    copy_dynamic_gas(memory, dest_offset, size, RETURNDATACOPY_DYNAMIC_BASE)
}

/// MCOPY expands over whichever of the two ranges reaches further.
pub fn mcopy_dynamic_gas(
    memory: &Memory,
    dest_offset: usize,
    src_offset: usize,
    size: usize,
) -> Result<u64, VMError> {
    let word_cost = MCOPY_DYNAMIC_BASE.saturating_mul(word_count(size));
    let src_expansion = expansion_for(memory, src_offset, size)?;
    let dest_expansion = expansion_for(memory, dest_offset, size)?;
    word_cost
        .checked_add(src_expansion.max(dest_expansion))
        .ok_or(VMError::OutOfGas)
}

pub fn log_dynamic_gas(
    memory: &Memory,
    offset: usize,
    size: usize,
    topic_count: u64,
) -> Result<u64, VMError> {
    let topic_cost = LOGN_DYNAMIC_BASE.saturating_mul(topic_count);
    let byte_cost = LOGN_DYNAMIC_BYTE_BASE.saturating_mul(u64::try_from(size).unwrap_or(u64::MAX));
    let memory_expansion_cost = expansion_for(memory, offset, size)?;
    topic_cost
        .checked_add(byte_cost)
        .and_then(|cost| cost.checked_add(memory_expansion_cost))
        .ok_or(VMError::OutOfGas)
}

/// SSTORE without transaction substate: a no-op write is cheap, populating
/// an empty slot is the expensive case, everything else is a modify.
pub fn sstore_dynamic_gas(current_value: U256, new_value: U256) -> u64 {
    if new_value == current_value {
        SSTORE_NOOP
    } else if current_value.is_zero() {
        SSTORE_CREATE_SLOT
    } else {
        SSTORE_MODIFY_SLOT
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn exp_cost_counts_significant_bytes() {
        assert_eq!(exp_dynamic_gas(U256::zero()), 0);
        assert_eq!(exp_dynamic_gas(U256::from(0xFF)), 50);
        assert_eq!(exp_dynamic_gas(U256::from(0x100)), 100);
        assert_eq!(exp_dynamic_gas(U256::MAX), 50 * 32);
    }

    #[test]
    fn word_counting_rounds_up() {
        assert_eq!(word_count(0), 0);
        assert_eq!(word_count(1), 1);
        assert_eq!(word_count(32), 1);
        assert_eq!(word_count(33), 2);
    }

    #[test]
    fn init_code_gas_matches_eip_3860() {
        assert_eq!(init_code_word_gas(0), 0);
        assert_eq!(init_code_word_gas(32), 2);
        assert_eq!(init_code_word_gas(49152), 2 * 1536);
    }
}
