use crate::constants::MAX_INITCODE_SIZE;
use crate::errors::VMError;
use crate::opcodes::Opcode;
use bitvec::prelude::*;
use bytes::Bytes;
use ethereum_types::U256;

/// Validated bytecode plus the three position bitmaps the rest of the
/// pipeline relies on:
///
/// * `is_op_start[i]`: byte `i` begins an instruction;
/// * `is_push_data[i]`: byte `i` is immediate data of a PUSH;
/// * `is_jumpdest[i]`: byte `i` is a JUMPDEST at an op start.
///
/// For every position exactly one of the first two bits is set, and a
/// jumpdest bit implies the op-start bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bytecode {
    code: Bytes,
    is_op_start: BitVec,
    is_push_data: BitVec,
    is_jumpdest: BitVec,
}

impl Bytecode {
    /// Validate runtime bytecode and build the bitmaps.
    pub fn new(code: Bytes) -> Result<Self, VMError> {
        Self::with_limit(code, None)
    }

    /// Validate initcode: same structural checks plus the EIP-3860 size cap.
    pub fn new_initcode(code: Bytes) -> Result<Self, VMError> {
        Self::with_limit(code, Some(MAX_INITCODE_SIZE))
    }

    fn with_limit(code: Bytes, max_size: Option<usize>) -> Result<Self, VMError> {
        if let Some(max_size) = max_size {
            if code.len() > max_size {
                return Err(VMError::BytecodeTooLarge);
            }
        }

        let len = code.len();
        let mut is_op_start = bitvec![0; len];
        let mut is_push_data = bitvec![0; len];
        let mut is_jumpdest = bitvec![0; len];

        // First pass: op starts and push data; undefined bytes and pushes
        // that reach past the end of the code are rejected outright.
        let mut pc = 0;
        while let Some(&byte) = code.get(pc) {
            let opcode = Opcode::from_byte(byte).ok_or(VMError::InvalidOpcode)?;
            is_op_start.set(pc, true);
            if let Some(n_bytes) = opcode.push_len() {
                let last_data = pc.checked_add(n_bytes).ok_or(VMError::OutOfBounds)?;
                if last_data >= len {
                    return Err(VMError::TruncatedPush);
                }
                for data_pc in pc.wrapping_add(1)..=last_data {
                    is_push_data.set(data_pc, true);
                }
                pc = last_data.wrapping_add(1);
            } else {
                pc = pc.wrapping_add(1);
            }
        }

        // Second pass: a JUMPDEST byte is a valid target only at an op
        // start, never inside push immediates.
        for pc in is_op_start.iter_ones() {
            if code.get(pc).copied() == Some(Opcode::JUMPDEST.to_byte()) {
                is_jumpdest.set(pc, true);
            }
        }

        let bytecode = Self {
            code,
            is_op_start,
            is_push_data,
            is_jumpdest,
        };

        // Third pass: conservative static pre-check of PUSH-fed jumps. A
        // constant target pointing past the end of the code can never
        // execute, so it is rejected here; an in-range target that is not a
        // JUMPDEST is left to trap at execution.
        bytecode.check_static_jumps()?;

        Ok(bytecode)
    }

    fn check_static_jumps(&self) -> Result<(), VMError> {
        let mut pc = 0;
        let mut previous_push: Option<(usize, usize)> = None;
        while let Some(opcode) = self.opcode_at(pc) {
            if matches!(opcode, Opcode::JUMP | Opcode::JUMPI) {
                if let Some((push_pc, n_bytes)) = previous_push {
                    let target = self.push_value_at(push_pc, n_bytes);
                    if target >= U256::from(self.code.len()) {
                        return Err(VMError::InvalidJumpDestination);
                    }
                }
            }
            let advance = match opcode.push_len() {
                Some(n_bytes) => {
                    previous_push = Some((pc, n_bytes));
                    n_bytes.wrapping_add(1)
                }
                None => {
                    previous_push = if opcode == Opcode::PUSH0 {
                        Some((pc, 0))
                    } else {
                        None
                    };
                    1
                }
            };
            pc = pc.wrapping_add(advance);
        }
        Ok(())
    }

    /// Decode the immediate of the PUSH at `push_pc` as a big-endian word.
    pub fn push_value_at(&self, push_pc: usize, n_bytes: usize) -> U256 {
        let start = push_pc.wrapping_add(1);
        let end = start.wrapping_add(n_bytes);
        self.code
            .get(start..end)
            .map(U256::from_big_endian)
            .unwrap_or_default()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn is_op_start(&self, pc: usize) -> bool {
        self.is_op_start.get(pc).is_some_and(|bit| *bit)
    }

    pub fn is_push_data(&self, pc: usize) -> bool {
        self.is_push_data.get(pc).is_some_and(|bit| *bit)
    }

    pub fn is_jumpdest(&self, pc: usize) -> bool {
        self.is_jumpdest.get(pc).is_some_and(|bit| *bit)
    }

    /// The opcode beginning at `pc`, if `pc` is an op start.
    pub fn opcode_at(&self, pc: usize) -> Option<Opcode> {
        if !self.is_op_start(pc) {
            return None;
        }
        self.code.get(pc).copied().and_then(Opcode::from_byte)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn bytecode(raw: &[u8]) -> Bytecode {
        Bytecode::new(Bytes::copy_from_slice(raw)).unwrap()
    }

    #[test]
    fn empty_code_is_valid() {
        let code = bytecode(&[]);
        assert!(code.is_empty());
    }

    #[test]
    fn op_start_and_push_data_partition_the_code() {
        // PUSH2 0x5B5B; JUMPDEST; STOP
        let code = bytecode(&[0x61, 0x5B, 0x5B, 0x5B, 0x00]);
        for pc in 0..code.len() {
            assert!(code.is_op_start(pc) ^ code.is_push_data(pc), "pc {pc}");
        }
        // The embedded 0x5B bytes are immediates, not jump targets.
        assert!(!code.is_jumpdest(1));
        assert!(!code.is_jumpdest(2));
        assert!(code.is_jumpdest(3));
    }

    #[test]
    fn undefined_byte_is_rejected() {
        assert_eq!(
            Bytecode::new(Bytes::copy_from_slice(&[0x01, 0x0C])),
            Err(VMError::InvalidOpcode)
        );
    }

    #[test]
    fn truncated_push_is_rejected() {
        // PUSH32 with only two immediate bytes present.
        assert_eq!(
            Bytecode::new(Bytes::copy_from_slice(&[0x7F, 0x01, 0x02])),
            Err(VMError::TruncatedPush)
        );
        // PUSH1 as the very last byte.
        assert_eq!(
            Bytecode::new(Bytes::copy_from_slice(&[0x00, 0x60])),
            Err(VMError::TruncatedPush)
        );
    }

    #[test]
    fn static_jump_past_the_end_is_rejected() {
        // PUSH1 0x10; JUMP; STOP: target 16 is past the 4-byte code.
        assert_eq!(
            Bytecode::new(Bytes::copy_from_slice(&[0x60, 0x10, 0x56, 0x00])),
            Err(VMError::InvalidJumpDestination)
        );
    }

    #[test]
    fn static_jump_to_non_jumpdest_in_range_validates() {
        // PUSH1 3; JUMP; STOP: in range, traps at execution instead.
        let code = bytecode(&[0x60, 0x03, 0x56, 0x00]);
        assert!(!code.is_jumpdest(3));
    }

    #[test]
    fn push0_jump_targets_offset_zero() {
        // PUSH0; JUMP back to a leading JUMPDEST validates.
        let code = bytecode(&[0x5B, 0x5F, 0x56]);
        assert!(code.is_jumpdest(0));
        // A constant target past the end of the code is rejected.
        assert_eq!(
            Bytecode::new(Bytes::copy_from_slice(&[0x5F, 0x60, 0x99, 0x56])),
            Err(VMError::InvalidJumpDestination)
        );
    }

    #[test]
    fn initcode_size_cap() {
        let oversized = vec![0x00u8; MAX_INITCODE_SIZE + 1];
        assert_eq!(
            Bytecode::new_initcode(Bytes::from(oversized)),
            Err(VMError::BytecodeTooLarge)
        );
        let max = vec![0x00u8; MAX_INITCODE_SIZE];
        assert!(Bytecode::new_initcode(Bytes::from(max)).is_ok());
    }
}
