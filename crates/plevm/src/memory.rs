use crate::constants::{MEMORY_EXPANSION_QUOTIENT, MEMORY_SIZE_LIMIT, WORD_SIZE};
use crate::errors::VMError;
use ethereum_types::U256;

/// Byte-addressable frame memory. The backing vector only ever grows, in
/// 32-byte steps; callers charge the expansion cost before touching a range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current logical size in bytes, always a multiple of 32.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, offset: usize) -> Result<(), VMError> {
        let target = offset
            .checked_next_multiple_of(WORD_SIZE)
            .ok_or(VMError::OutOfBounds)?;
        if target > MEMORY_SIZE_LIMIT {
            return Err(VMError::OutOfBounds);
        }
        if target > self.data.len() {
            self.data
                .try_reserve(target.saturating_sub(self.data.len()))
                .map_err(|_| VMError::AllocationError)?;
            self.data.resize(target, 0);
        }
        Ok(())
    }

    pub fn load_word(&mut self, offset: usize) -> Result<U256, VMError> {
        let end = offset.checked_add(WORD_SIZE).ok_or(VMError::OutOfBounds)?;
        self.resize(end)?;
        let slice = self.data.get(offset..end).ok_or(VMError::OutOfBounds)?;
        Ok(U256::from_big_endian(slice))
    }

    pub fn load_range(&mut self, offset: usize, size: usize) -> Result<Vec<u8>, VMError> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let end = offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        self.resize(end)?;
        let slice = self.data.get(offset..end).ok_or(VMError::OutOfBounds)?;
        Ok(slice.to_vec())
    }

    pub fn store_word(&mut self, offset: usize, value: U256) -> Result<(), VMError> {
        let mut bytes = [0u8; WORD_SIZE];
        value.to_big_endian(&mut bytes);
        self.store_range(offset, &bytes)
    }

    pub fn store_byte(&mut self, offset: usize, value: u8) -> Result<(), VMError> {
        self.store_range(offset, &[value])
    }

    pub fn store_range(&mut self, offset: usize, value: &[u8]) -> Result<(), VMError> {
        if value.is_empty() {
            return Ok(());
        }
        let end = offset.checked_add(value.len()).ok_or(VMError::OutOfBounds)?;
        self.resize(end)?;
        self.data
            .get_mut(offset..end)
            .ok_or(VMError::OutOfBounds)?
            .copy_from_slice(value);
        Ok(())
    }

    /// Grow to cover `[offset, offset + size)` without touching any data.
    pub fn expand(&mut self, offset: usize, size: usize) -> Result<(), VMError> {
        if size == 0 {
            return Ok(());
        }
        let end = offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        self.resize(end)
    }

    /// Memory-to-memory copy with overlap handled in either direction.
    pub fn copy(&mut self, dest_offset: usize, src_offset: usize, size: usize) -> Result<(), VMError> {
        if size == 0 {
            return Ok(());
        }
        let src_end = src_offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        let dest_end = dest_offset.checked_add(size).ok_or(VMError::OutOfBounds)?;
        self.resize(src_end.max(dest_end))?;
        if src_end > self.data.len() || dest_end > self.data.len() {
            return Err(VMError::OutOfBounds);
        }
        self.data.copy_within(src_offset..src_end, dest_offset);
        Ok(())
    }

    /// Gas cost of growing to `new_byte_size`, as a delta over what was
    /// already paid for the current size: `3·w + ⌊w²/512⌋` with `w` in words.
    pub fn expansion_cost(&self, new_byte_size: usize) -> Result<u64, VMError> {
        if new_byte_size <= self.data.len() {
            return Ok(0);
        }
        if new_byte_size > MEMORY_SIZE_LIMIT {
            return Err(VMError::OutOfBounds);
        }
        let new_cost = word_aligned_cost(new_byte_size)?;
        let last_cost = word_aligned_cost(self.data.len())?;
        new_cost.checked_sub(last_cost).ok_or(VMError::OutOfGas)
    }
}

fn word_aligned_cost(byte_size: usize) -> Result<u64, VMError> {
    let words = crate::gas_cost::word_count(byte_size);
    let quadratic = words
        .checked_mul(words)
        .and_then(|square| square.checked_div(MEMORY_EXPANSION_QUOTIENT))
        .ok_or(VMError::OutOfGas)?;
    words
        .checked_mul(3)
        .and_then(|linear| linear.checked_add(quadratic))
        .ok_or(VMError::OutOfGas)
}
