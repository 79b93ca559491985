use crate::call_frame::Log;
use bytes::Bytes;
use ethereum_types::Address;
use serde::Serialize;

/// Errors that halt the frame. Validation errors are surfaced before
/// execution starts; execution errors unwind the frame immediately and
/// consume the remaining gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
pub enum VMError {
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("out of gas")]
    OutOfGas,
    #[error("jump to an invalid destination")]
    InvalidJump,
    #[error("opcode not defined")]
    InvalidOpcode,
    #[error("offset out of bounds")]
    OutOfBounds,
    #[error("state mutation in a static context")]
    WriteProtection,
    #[error("bytecode exceeds the size limit")]
    BytecodeTooLarge,
    #[error("push reaches past the end of the bytecode")]
    TruncatedPush,
    #[error("constant jump target is not a code position")]
    InvalidJumpDestination,
    #[error("allocation failure")]
    AllocationError,
}

impl VMError {
    /// True for the errors the validator can produce; everything else only
    /// happens while a frame is running.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            VMError::InvalidOpcode
                | VMError::TruncatedPush
                | VMError::InvalidJumpDestination
                | VMError::BytecodeTooLarge
                | VMError::AllocationError
        )
    }
}

/// Outcome of a single handler: keep going, or finish the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpcodeSuccess {
    Continue,
    Result(ResultReason),
}

/// The opcode that terminated the frame normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResultReason {
    Stop,
    Return,
    Revert,
    SelfDestruct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExecutionResult {
    /// The frame reached STOP, RETURN, REVERT or SELFDESTRUCT.
    Success(ResultReason),
    /// The frame failed; remaining gas is consumed.
    Halt(VMError),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, ExecutionResult::Success(ResultReason::Revert))
    }
}

/// What the host gets back from a finished frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub result: ExecutionResult,
    pub gas_used: u64,
    pub gas_remaining: u64,
    pub output: Bytes,
    pub logs: Vec<Log>,
    pub selfdestructs: Vec<(Address, Address)>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}
