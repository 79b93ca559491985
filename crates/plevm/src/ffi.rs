//! Handle-based C-ABI surface for embedding the engine: create a frame from
//! raw bytecode and a gas budget, seed its stack, execute, inspect gas and
//! the terminal status, destroy. Status codes form a stable closed set;
//! version and build info are exposed as read-only strings.
#![allow(unsafe_code)]

use crate::call_frame::CallFrame;
use crate::code::Bytecode;
use crate::constants::WORD_SIZE;
use crate::db::InMemoryDb;
use crate::environment::Environment;
use crate::errors::{ExecutionReport, ExecutionResult, ResultReason, VMError};
use crate::plan::Plan;
use crate::planner::Planner;
use crate::vm::VM;
use bytes::Bytes;
use ethereum_types::U256;
use std::os::raw::c_char;

pub const PLEVM_STATUS_STOP: i32 = 0;
pub const PLEVM_STATUS_RETURN: i32 = 1;
pub const PLEVM_STATUS_REVERT: i32 = 2;
pub const PLEVM_STATUS_SELFDESTRUCT: i32 = 3;

pub const PLEVM_ERR_STACK_OVERFLOW: i32 = -1;
pub const PLEVM_ERR_STACK_UNDERFLOW: i32 = -2;
pub const PLEVM_ERR_OUT_OF_GAS: i32 = -3;
pub const PLEVM_ERR_INVALID_JUMP: i32 = -4;
pub const PLEVM_ERR_INVALID_OPCODE: i32 = -5;
pub const PLEVM_ERR_OUT_OF_BOUNDS: i32 = -6;
pub const PLEVM_ERR_WRITE_PROTECTION: i32 = -7;
pub const PLEVM_ERR_BYTECODE_TOO_LARGE: i32 = -8;
pub const PLEVM_ERR_TRUNCATED_PUSH: i32 = -9;
pub const PLEVM_ERR_INVALID_JUMP_DESTINATION: i32 = -10;
pub const PLEVM_ERR_ALLOCATION: i32 = -11;

pub const PLEVM_ERR_BAD_HANDLE: i32 = -100;
pub const PLEVM_ERR_NOT_EXECUTED: i32 = -101;

/// Everything one embedded execution needs, behind one opaque pointer.
pub struct EvmHandle {
    plan: Plan,
    frame: CallFrame,
    vm: VM,
    report: Option<ExecutionReport>,
}

pub fn error_code(error: VMError) -> i32 {
    match error {
        VMError::StackOverflow => PLEVM_ERR_STACK_OVERFLOW,
        VMError::StackUnderflow => PLEVM_ERR_STACK_UNDERFLOW,
        VMError::OutOfGas => PLEVM_ERR_OUT_OF_GAS,
        VMError::InvalidJump => PLEVM_ERR_INVALID_JUMP,
        VMError::InvalidOpcode => PLEVM_ERR_INVALID_OPCODE,
        VMError::OutOfBounds => PLEVM_ERR_OUT_OF_BOUNDS,
        VMError::WriteProtection => PLEVM_ERR_WRITE_PROTECTION,
        VMError::BytecodeTooLarge => PLEVM_ERR_BYTECODE_TOO_LARGE,
        VMError::TruncatedPush => PLEVM_ERR_TRUNCATED_PUSH,
        VMError::InvalidJumpDestination => PLEVM_ERR_INVALID_JUMP_DESTINATION,
        VMError::AllocationError => PLEVM_ERR_ALLOCATION,
    }
}

pub fn status_code(report: &ExecutionReport) -> i32 {
    match &report.result {
        ExecutionResult::Success(ResultReason::Stop) => PLEVM_STATUS_STOP,
        ExecutionResult::Success(ResultReason::Return) => PLEVM_STATUS_RETURN,
        ExecutionResult::Success(ResultReason::Revert) => PLEVM_STATUS_REVERT,
        ExecutionResult::Success(ResultReason::SelfDestruct) => PLEVM_STATUS_SELFDESTRUCT,
        ExecutionResult::Halt(error) => error_code(*error),
    }
}

/// Validate `code_len` bytes at `code`, plan them, and return a ready
/// frame. On failure returns null and, when `error_out` is non-null, the
/// validation error code.
///
/// # Safety
/// `code` must point to `code_len` readable bytes (or be null with
/// `code_len == 0`); `error_out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn plevm_create(
    code: *const u8,
    code_len: usize,
    gas_limit: u64,
    error_out: *mut i32,
) -> *mut EvmHandle {
    let set_error = |error_out: *mut i32, code: i32| {
        if !error_out.is_null() {
            // SAFETY: non-null per the caller contract.
            unsafe { error_out.write(code) };
        }
    };

    let raw = if code.is_null() || code_len == 0 {
        &[]
    } else {
        // SAFETY: caller guarantees code_len readable bytes.
        unsafe { std::slice::from_raw_parts(code, code_len) }
    };

    let bytecode = match Bytecode::new(Bytes::copy_from_slice(raw)) {
        Ok(bytecode) => bytecode,
        Err(error) => {
            set_error(error_out, error_code(error));
            return std::ptr::null_mut();
        }
    };
    let plan = match Planner::new(&bytecode).plan() {
        Ok(plan) => plan,
        Err(error) => {
            set_error(error_out, error_code(error));
            return std::ptr::null_mut();
        }
    };

    let frame = CallFrame::new(bytecode, gas_limit);
    let vm = VM::new(Environment::default(), Box::new(InMemoryDb::new()));
    set_error(error_out, 0);
    Box::into_raw(Box::new(EvmHandle {
        plan,
        frame,
        vm,
        report: None,
    }))
}

/// Run the frame to its terminal status and return the status code.
///
/// # Safety
/// `handle` must be a pointer from `plevm_create` not yet destroyed.
#[no_mangle]
pub unsafe extern "C" fn plevm_execute(handle: *mut EvmHandle) -> i32 {
    // SAFETY: valid handle per the caller contract.
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return PLEVM_ERR_BAD_HANDLE;
    };
    let report = handle.vm.execute(&handle.plan, &mut handle.frame);
    let code = status_code(&report);
    handle.report = Some(report);
    code
}

/// Push a 32-byte big-endian word onto the frame's stack.
///
/// # Safety
/// `handle` as for `plevm_execute`; `word` must point to 32 readable bytes.
#[no_mangle]
pub unsafe extern "C" fn plevm_stack_push(handle: *mut EvmHandle, word: *const u8) -> i32 {
    // SAFETY: valid handle per the caller contract.
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return PLEVM_ERR_BAD_HANDLE;
    };
    if word.is_null() {
        return PLEVM_ERR_BAD_HANDLE;
    }
    // SAFETY: 32 readable bytes per the caller contract.
    let bytes = unsafe { std::slice::from_raw_parts(word, WORD_SIZE) };
    match handle.frame.stack.push(U256::from_big_endian(bytes)) {
        Ok(()) => 0,
        Err(error) => error_code(error),
    }
}

/// Pop the top of the stack into a caller-provided 32-byte buffer.
///
/// # Safety
/// `handle` as for `plevm_execute`; `word_out` must point to 32 writable
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn plevm_stack_pop(handle: *mut EvmHandle, word_out: *mut u8) -> i32 {
    // SAFETY: valid handle per the caller contract.
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return PLEVM_ERR_BAD_HANDLE;
    };
    if word_out.is_null() {
        return PLEVM_ERR_BAD_HANDLE;
    }
    match handle.frame.stack.pop() {
        Ok(value) => {
            let mut bytes = [0u8; WORD_SIZE];
            value.to_big_endian(&mut bytes);
            // SAFETY: 32 writable bytes per the caller contract.
            unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), word_out, WORD_SIZE) };
            0
        }
        Err(error) => error_code(error),
    }
}

/// Gas still available to the frame.
///
/// # Safety
/// `handle` as for `plevm_execute`.
#[no_mangle]
pub unsafe extern "C" fn plevm_gas_remaining(handle: *const EvmHandle) -> i64 {
    // SAFETY: valid handle per the caller contract.
    match unsafe { handle.as_ref() } {
        Some(handle) => handle.frame.gas_remaining,
        None => 0,
    }
}

/// Status of the last `plevm_execute`, or `PLEVM_ERR_NOT_EXECUTED`.
///
/// # Safety
/// `handle` as for `plevm_execute`.
#[no_mangle]
pub unsafe extern "C" fn plevm_final_status(handle: *const EvmHandle) -> i32 {
    // SAFETY: valid handle per the caller contract.
    match unsafe { handle.as_ref() } {
        Some(handle) => handle
            .report
            .as_ref()
            .map_or(PLEVM_ERR_NOT_EXECUTED, status_code),
        None => PLEVM_ERR_BAD_HANDLE,
    }
}

/// Engine version as a static NUL-terminated string.
#[no_mangle]
pub extern "C" fn plevm_version() -> *const c_char {
    static VERSION: &[u8] = concat!("plevm ", env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr().cast()
}

/// Release a handle. Passing null is a no-op.
///
/// # Safety
/// `handle` must be null or a pointer from `plevm_create` not yet
/// destroyed; it is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn plevm_destroy(handle: *mut EvmHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: exclusive ownership handed back per the caller contract.
    drop(unsafe { Box::from_raw(handle) });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn embedded_add_round_trip() {
        // PUSH1 5; PUSH1 3; ADD; STOP
        let code = [0x60u8, 0x05, 0x60, 0x03, 0x01, 0x00];
        let mut error = -999;
        // SAFETY: pointers come from live local buffers.
        unsafe {
            let handle = plevm_create(code.as_ptr(), code.len(), 100_000, &mut error);
            assert_eq!(error, 0);
            assert!(!handle.is_null());
            assert_eq!(plevm_final_status(handle), PLEVM_ERR_NOT_EXECUTED);
            assert_eq!(plevm_execute(handle), PLEVM_STATUS_STOP);

            let mut word = [0u8; 32];
            assert_eq!(plevm_stack_pop(handle, word.as_mut_ptr()), 0);
            assert_eq!(word[31], 8);
            assert!(plevm_gas_remaining(handle) > 0);
            plevm_destroy(handle);
        }
    }

    #[test]
    fn invalid_bytecode_reports_through_error_out() {
        let code = [0x0Cu8];
        let mut error = 0;
        // SAFETY: pointers come from live local buffers.
        unsafe {
            let handle = plevm_create(code.as_ptr(), code.len(), 100_000, &mut error);
            assert!(handle.is_null());
            assert_eq!(error, PLEVM_ERR_INVALID_OPCODE);
        }
    }

    #[test]
    fn null_handles_are_rejected() {
        // SAFETY: null is explicitly allowed by every entry point.
        unsafe {
            assert_eq!(plevm_execute(std::ptr::null_mut()), PLEVM_ERR_BAD_HANDLE);
            assert_eq!(plevm_final_status(std::ptr::null()), PLEVM_ERR_BAD_HANDLE);
            assert_eq!(plevm_gas_remaining(std::ptr::null()), 0);
            plevm_destroy(std::ptr::null_mut());
        }
    }

    #[test]
    fn version_is_nul_terminated() {
        let version = plevm_version();
        assert!(!version.is_null());
        // SAFETY: plevm_version returns a static NUL-terminated buffer.
        let text = unsafe { std::ffi::CStr::from_ptr(version) };
        assert!(text.to_str().unwrap().starts_with("plevm "));
    }
}
