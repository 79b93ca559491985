#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]

use plevm::call_frame::CallFrame;
use plevm::code::Bytecode;
use plevm::constants::{MAX_INITCODE_SIZE, STACK_LIMIT};
use plevm::db::InMemoryDb;
use plevm::environment::Environment;
use plevm::errors::{ExecutionResult, ResultReason, VMError};
use plevm::planner::{Planner, PlannerConfig};
use plevm::primitives::{Bytes, U256};
use plevm::tracer::Tracer;
use plevm::utils::{new_vm_with_bytecode, new_vm_with_bytecode_and_config, DEFAULT_GAS_LIMIT};
use plevm::vm::VM;

// -------------------------------------------------------------------------
// Validator
// -------------------------------------------------------------------------

#[test]
fn undefined_opcodes_fail_validation() {
    for byte in [0x0Cu8, 0x1F, 0x21, 0x4B, 0xA5, 0xEF, 0xFB] {
        assert_eq!(
            Bytecode::new(Bytes::copy_from_slice(&[byte])),
            Err(VMError::InvalidOpcode),
            "byte {byte:#04x} should be invalid"
        );
    }
}

#[test]
fn push32_at_the_end_without_its_data_is_truncated() {
    let mut raw = vec![0x7Fu8];
    raw.extend_from_slice(&[0u8; 31]); // one byte short
    assert_eq!(
        Bytecode::new(Bytes::from(raw)),
        Err(VMError::TruncatedPush)
    );
}

#[test]
fn push32_with_exactly_its_data_validates() {
    let mut raw = vec![0x7Fu8];
    raw.extend_from_slice(&[0u8; 32]);
    assert!(Bytecode::new(Bytes::from(raw)).is_ok());
}

#[test]
fn bitmap_partition_invariant_holds() {
    let programs: [&[u8]; 4] = [
        &[0x60, 0x05, 0x60, 0x03, 0x01, 0x00],
        &[], // empty
        &[0x5B, 0x60, 0x5B, 0x00],
        &[0x61, 0x5B, 0x5B, 0x5B, 0x58, 0x00],
    ];
    for raw in programs {
        let code = Bytecode::new(Bytes::copy_from_slice(raw)).unwrap();
        for pc in 0..code.len() {
            assert!(
                code.is_op_start(pc) ^ code.is_push_data(pc),
                "position {pc} must be exactly one of op start / push data"
            );
            if code.is_jumpdest(pc) {
                assert!(code.is_op_start(pc));
                assert_eq!(code.bytes()[pc], 0x5B);
            }
        }
    }
}

#[test]
fn static_jump_out_of_range_is_rejected_at_validation() {
    // PUSH1 0x10; JUMP; STOP: the constant target 16 can never be code.
    assert_eq!(
        Bytecode::new(Bytes::copy_from_slice(&[0x60, 0x10, 0x56, 0x00])),
        Err(VMError::InvalidJumpDestination)
    );
}

#[test]
fn static_jumpi_out_of_range_is_rejected_at_validation() {
    assert_eq!(
        Bytecode::new(Bytes::copy_from_slice(&[0x60, 0x00, 0x60, 0x20, 0x57, 0x00])),
        Err(VMError::InvalidJumpDestination)
    );
}

#[test]
fn initcode_over_the_limit_is_rejected() {
    let oversized = vec![0x5Bu8; MAX_INITCODE_SIZE + 1];
    assert_eq!(
        Bytecode::new_initcode(Bytes::from(oversized)),
        Err(VMError::BytecodeTooLarge)
    );
}

// -------------------------------------------------------------------------
// Jump destinations inside push data
// -------------------------------------------------------------------------

#[test]
fn jumpdest_byte_inside_push_data_is_not_a_target() {
    // PUSH1 4; JUMP; PUSH1 0x5B; STOP: position 4 holds 0x5B but is data.
    let raw = [0x60, 0x04, 0x56, 0x60, 0x5B, 0x00];
    let code = Bytecode::new(Bytes::copy_from_slice(&raw)).unwrap();
    assert!(!code.is_jumpdest(4));
    assert!(code.is_push_data(4));

    let (plan, mut frame, mut vm) = new_vm_with_bytecode(Bytes::copy_from_slice(&raw)).unwrap();
    let report = vm.execute(&plan, &mut frame);
    assert_eq!(report.result, ExecutionResult::Halt(VMError::InvalidJump));
}

#[test]
fn dynamic_jump_to_push_data_traps() {
    // The target is computed (3 + 4 = 7), defeating the static pre-check;
    // position 7 is the 0x5B immediate of the trailing PUSH1.
    // PUSH1 3; PUSH1 4; ADD; JUMP; PUSH1 0x5B; STOP
    let raw = [0x60, 0x03, 0x60, 0x04, 0x01, 0x56, 0x60, 0x5B, 0x00];
    let (plan, mut frame, mut vm) = new_vm_with_bytecode(Bytes::copy_from_slice(&raw)).unwrap();
    let report = vm.execute(&plan, &mut frame);
    assert_eq!(report.result, ExecutionResult::Halt(VMError::InvalidJump));
}

// -------------------------------------------------------------------------
// Fusion on / fusion off equivalence
// -------------------------------------------------------------------------

fn observe(raw: &[u8], fusion: bool) -> (ExecutionResult, u64, Bytes, Vec<U256>, usize) {
    let (plan, mut frame, mut vm) = new_vm_with_bytecode_and_config(
        Bytes::copy_from_slice(raw),
        PlannerConfig {
            enable_fusion: fusion,
        },
    )
    .unwrap();
    let report = vm.execute(&plan, &mut frame);
    (
        report.result,
        report.gas_used,
        report.output,
        frame.stack.values().to_vec(),
        frame.memory.size(),
    )
}

#[test]
fn fusion_does_not_change_observable_behavior() {
    let programs: [&[u8]; 7] = [
        // PUSH+ADD chain.
        &[0x60, 0x05, 0x60, 0x03, 0x01, 0x60, 0x02, 0x02, 0x00],
        // PUSH+SUB and PUSH+DIV.
        &[0x60, 0x02, 0x60, 0x0A, 0x03, 0x60, 0x14, 0x04, 0x00],
        // Forward fused jump.
        &[0x60, 0x04, 0x56, 0x00, 0x5B, 0x60, 0x2A, 0x00],
        // Fused JUMPI, taken and not taken.
        &[0x60, 0x01, 0x60, 0x08, 0x57, 0x60, 0x07, 0x00, 0x5B, 0x00],
        &[0x60, 0x00, 0x60, 0x08, 0x57, 0x60, 0x07, 0x00, 0x5B, 0x00],
        // Invalid constant jump (in range, not a JUMPDEST).
        &[0x60, 0x03, 0x56, 0x00],
        // Memory traffic and RETURN.
        &[
            0x61, 0xBE, 0xEF, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3,
        ],
    ];

    for raw in programs {
        let fused = observe(raw, true);
        let unfused = observe(raw, false);
        assert_eq!(fused, unfused, "program {raw:02x?} diverged under fusion");
    }
}

#[test]
fn fusion_equivalence_holds_for_div_by_zero() {
    // PUSH1 7; DIV with a zero divisor already on the stack.
    let raw = [0x60, 0x00, 0x60, 0x07, 0x04, 0x00];
    assert_eq!(observe(&raw, true), observe(&raw, false));
}

#[test]
fn fusion_is_skipped_when_the_successor_is_a_jumpdest() {
    // PUSH1 1; JUMPDEST; ADD would change meaning if fused across the
    // block boundary; the jumpdest must stay a jump target.
    let raw = [0x60, 0x01, 0x5B, 0x60, 0x02, 0x01, 0x00];
    let code = Bytecode::new(Bytes::copy_from_slice(&raw)).unwrap();
    let plan = Planner::new(&code).plan().unwrap();
    assert!(plan.jump_target(2).is_some());

    assert_eq!(observe(&raw, true), observe(&raw, false));
}

// -------------------------------------------------------------------------
// Plan shape
// -------------------------------------------------------------------------

#[test]
fn jump_targets_map_only_jumpdests() {
    let raw = [0x5B, 0x60, 0x00, 0x50, 0x5B, 0x00];
    let code = Bytecode::new(Bytes::copy_from_slice(&raw)).unwrap();
    let plan = Planner::new(&code).plan().unwrap();

    assert!(plan.jump_target(0).is_some());
    assert!(plan.jump_target(4).is_some());
    for pc in [1usize, 2, 3, 5, 100] {
        assert!(plan.jump_target(pc).is_none(), "pc {pc}");
    }
}

#[test]
fn constants_pool_is_only_used_for_wide_immediates() {
    let mut raw = vec![0x60, 0x01]; // PUSH1, stays inline
    raw.push(0x7F); // PUSH32, goes to the pool
    raw.extend_from_slice(&[0xFF; 32]);
    raw.push(0x00);
    let code = Bytecode::new(Bytes::from(raw)).unwrap();
    let plan = Planner::new(&code).plan().unwrap();

    assert_eq!(plan.constants().len(), 1);
    assert_eq!(plan.constants()[0], U256::MAX);
}

#[test]
fn stream_length_is_linear_in_code_size() {
    let raw = vec![0x5Bu8; 1000];
    let code = Bytecode::new(Bytes::from(raw)).unwrap();
    let plan = Planner::new(&code).plan().unwrap();
    // Each JUMPDEST is two elements, plus the terminal STOP.
    assert_eq!(plan.len(), 2001);
}

// -------------------------------------------------------------------------
// Tracer hooks
// -------------------------------------------------------------------------

#[derive(Default)]
struct CountingTracer {
    steps: usize,
    errors: Vec<VMError>,
    pcs: Vec<usize>,
}

impl Tracer for CountingTracer {
    fn before_op(&mut self, pc: usize, _frame: &CallFrame) {
        self.steps += 1;
        self.pcs.push(pc);
    }

    fn on_error(&mut self, error: &VMError) {
        self.errors.push(*error);
    }
}

#[test]
fn tracer_sees_every_step_and_the_error() {
    let code = Bytecode::new(Bytes::copy_from_slice(&[0x60, 0x03, 0x56, 0x00])).unwrap();
    let plan = Planner::new(&code).plan().unwrap();
    let mut frame = CallFrame::new(code, DEFAULT_GAS_LIMIT);
    let mut vm = VM::with_tracer(
        Environment::default(),
        Box::new(InMemoryDb::new()),
        CountingTracer::default(),
    );

    let report = vm.execute(&plan, &mut frame);
    assert_eq!(report.result, ExecutionResult::Halt(VMError::InvalidJump));
    // BeginBlock and the fused jump.
    assert_eq!(vm.tracer.steps, 2);
    assert_eq!(vm.tracer.errors, vec![VMError::InvalidJump]);
}

#[test]
fn tracer_reports_source_offsets() {
    let code = Bytecode::new(Bytes::copy_from_slice(&[0x5F, 0x50, 0x00])).unwrap();
    let plan = Planner::new(&code).plan().unwrap();
    let mut frame = CallFrame::new(code, DEFAULT_GAS_LIMIT);
    let mut vm = VM::with_tracer(
        Environment::default(),
        Box::new(InMemoryDb::new()),
        CountingTracer::default(),
    );

    let report = vm.execute(&plan, &mut frame);
    assert_eq!(report.result, ExecutionResult::Success(ResultReason::Stop));
    // BeginBlock at 0, PUSH0 at 0, POP at 1, STOP at 2.
    assert_eq!(vm.tracer.pcs, vec![0, 0, 1, 2]);
}

// -------------------------------------------------------------------------
// Stack ceiling across the planner path
// -------------------------------------------------------------------------

#[test]
fn exactly_1024_pushes_fit() {
    let mut raw = vec![0x5Fu8; STACK_LIMIT];
    raw.push(0x00);
    let (plan, mut frame, mut vm) = new_vm_with_bytecode(Bytes::from(raw)).unwrap();

    let report = vm.execute(&plan, &mut frame);
    assert_eq!(report.result, ExecutionResult::Success(ResultReason::Stop));
    assert_eq!(frame.stack.len(), STACK_LIMIT);
}

#[test]
fn the_1025th_push_overflows() {
    let mut raw = vec![0x5Fu8; STACK_LIMIT + 1];
    raw.push(0x00);
    let (plan, mut frame, mut vm) = new_vm_with_bytecode(Bytes::from(raw)).unwrap();

    let report = vm.execute(&plan, &mut frame);
    assert_eq!(report.result, ExecutionResult::Halt(VMError::StackOverflow));
}
