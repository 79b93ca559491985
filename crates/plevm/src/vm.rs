use crate::call_frame::CallFrame;
use crate::constants::STACK_LIMIT;
use crate::db::Database;
use crate::environment::Environment;
use crate::errors::{ExecutionReport, ExecutionResult, OpcodeSuccess, ResultReason, VMError};
use crate::gas_cost;
use crate::opcodes::Opcode;
use crate::plan::{HandlerId, Plan};
use crate::tracer::{NoopTracer, Tracer};
use ethereum_types::Address;

/// Effects accrued outside the frame proper; today that is the
/// self-destruct ledger, recorded as `(destructed, beneficiary)` pairs in
/// execution order.
#[derive(Debug, Clone, Default)]
pub struct Substate {
    pub selfdestructs: Vec<(Address, Address)>,
}

/// The interpreter. Owns the execution context shared by every frame it
/// drives (environment, storage interface, substate, tracer); the plan and
/// the frame are passed into `execute` so their lifetimes stay outside.
///
/// Dispatch is a central loop over the instruction stream; Rust has no
/// guaranteed tail calls, so threaded handler-to-handler transfers become
/// one match indexed by the current element's handler id.
pub struct VM<T: Tracer = NoopTracer> {
    pub env: Environment,
    pub db: Box<dyn Database>,
    pub substate: Substate,
    pub tracer: T,
}

impl VM<NoopTracer> {
    pub fn new(env: Environment, db: Box<dyn Database>) -> Self {
        Self::with_tracer(env, db, NoopTracer)
    }
}

impl<T: Tracer> VM<T> {
    pub fn with_tracer(env: Environment, db: Box<dyn Database>, tracer: T) -> Self {
        Self {
            env,
            db,
            substate: Substate::default(),
            tracer,
        }
    }

    /// Drive `frame` over `plan` to a terminal status and report the
    /// outcome. Failures consume the remaining gas; REVERT keeps it.
    pub fn execute(&mut self, plan: &Plan, frame: &mut CallFrame) -> ExecutionReport {
        let outcome = self.run(plan, frame);
        let (result, gas_remaining) = match outcome {
            Ok(reason) => (
                ExecutionResult::Success(reason),
                u64::try_from(frame.gas_remaining).unwrap_or(0),
            ),
            Err(error) => {
                self.tracer.on_error(&error);
                frame.gas_remaining = 0;
                (ExecutionResult::Halt(error), 0)
            }
        };
        ExecutionReport {
            result,
            gas_used: frame.gas_limit.saturating_sub(gas_remaining),
            gas_remaining,
            output: frame.output.clone(),
            logs: frame.logs.clone(),
            selfdestructs: self.substate.selfdestructs.clone(),
        }
    }

    fn run(&mut self, plan: &Plan, frame: &mut CallFrame) -> Result<ResultReason, VMError> {
        if frame.is_initcode {
            frame.charge_dynamic(gas_cost::init_code_word_gas(frame.code.len()))?;
        }

        loop {
            let element = plan.element(frame.index).ok_or(VMError::OutOfBounds)?;
            let handler = HandlerId::from_index(element.raw()).ok_or(VMError::InvalidOpcode)?;

            // Table-driven pre-validation: the handler may assume this
            // depth and this much headroom.
            let info = handler.info();
            let depth = frame.stack.len();
            if depth < usize::from(info.min_stack) {
                return Err(VMError::StackUnderflow);
            }
            if info.stack_delta > 0 {
                let growth = usize::try_from(info.stack_delta).unwrap_or_default();
                if depth.saturating_add(growth) > STACK_LIMIT {
                    return Err(VMError::StackOverflow);
                }
            }

            let pc = plan.pc_at(frame.index);
            self.tracer.before_op(pc, frame);

            match self.step(handler, plan, frame)? {
                OpcodeSuccess::Continue => {
                    self.tracer.after_op(pc, frame);
                }
                OpcodeSuccess::Result(reason) => {
                    self.tracer.after_op(pc, frame);
                    return Ok(reason);
                }
            }
        }
    }

    fn step(
        &mut self,
        handler: HandlerId,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        match handler {
            HandlerId::Op(opcode) => self.execute_opcode(opcode, plan, frame),
            HandlerId::BeginBlock => self.op_begin_block(plan, frame),
            HandlerId::PushInline => self.op_push_inline(plan, frame),
            HandlerId::PushPointer => self.op_push_pointer(plan, frame),
            HandlerId::PushAddInline => self.op_push_add(plan, frame),
            HandlerId::PushSubInline => self.op_push_sub(plan, frame),
            HandlerId::PushMulInline => self.op_push_mul(plan, frame),
            HandlerId::PushDivInline => self.op_push_div(plan, frame),
            HandlerId::PushJumpPointer => self.op_push_jump(plan, frame),
            HandlerId::PushJumpInvalid => self.op_push_jump_invalid(frame),
            HandlerId::PushJumpiPointer => self.op_push_jumpi(plan, frame),
            HandlerId::PushJumpiInvalid => self.op_push_jumpi_invalid(frame),
        }
    }

    fn execute_opcode(
        &mut self,
        opcode: Opcode,
        plan: &Plan,
        frame: &mut CallFrame,
    ) -> Result<OpcodeSuccess, VMError> {
        match opcode {
            Opcode::STOP => self.op_stop(frame),
            Opcode::ADD => self.op_add(frame),
            Opcode::MUL => self.op_mul(frame),
            Opcode::SUB => self.op_sub(frame),
            Opcode::DIV => self.op_div(frame),
            Opcode::SDIV => self.op_sdiv(frame),
            Opcode::MOD => self.op_mod(frame),
            Opcode::SMOD => self.op_smod(frame),
            Opcode::ADDMOD => self.op_addmod(frame),
            Opcode::MULMOD => self.op_mulmod(frame),
            Opcode::EXP => self.op_exp(frame),
            Opcode::SIGNEXTEND => self.op_signextend(frame),
            Opcode::LT => self.op_lt(frame),
            Opcode::GT => self.op_gt(frame),
            Opcode::SLT => self.op_slt(frame),
            Opcode::SGT => self.op_sgt(frame),
            Opcode::EQ => self.op_eq(frame),
            Opcode::ISZERO => self.op_iszero(frame),
            Opcode::AND => self.op_and(frame),
            Opcode::OR => self.op_or(frame),
            Opcode::XOR => self.op_xor(frame),
            Opcode::NOT => self.op_not(frame),
            Opcode::BYTE => self.op_byte(frame),
            Opcode::SHL => self.op_shl(frame),
            Opcode::SHR => self.op_shr(frame),
            Opcode::SAR => self.op_sar(frame),
            Opcode::KECCAK256 => self.op_keccak256(frame),
            Opcode::ADDRESS => self.op_address(frame),
            Opcode::BALANCE => self.op_balance(frame),
            Opcode::ORIGIN => self.op_origin(frame),
            Opcode::CALLER => self.op_caller(frame),
            Opcode::CALLVALUE => self.op_callvalue(frame),
            Opcode::CALLDATALOAD => self.op_calldataload(frame),
            Opcode::CALLDATASIZE => self.op_calldatasize(frame),
            Opcode::CALLDATACOPY => self.op_calldatacopy(frame),
            Opcode::CODESIZE => self.op_codesize(frame),
            Opcode::CODECOPY => self.op_codecopy(frame),
            Opcode::GASPRICE => self.op_gasprice(frame),
            Opcode::EXTCODESIZE => self.op_extcodesize(frame),
            Opcode::EXTCODECOPY => self.op_extcodecopy(frame),
            Opcode::RETURNDATASIZE => self.op_returndatasize(frame),
            Opcode::RETURNDATACOPY => self.op_returndatacopy(frame),
            Opcode::EXTCODEHASH => self.op_extcodehash(frame),
            Opcode::BLOCKHASH => self.op_blockhash(frame),
            Opcode::COINBASE => self.op_coinbase(frame),
            Opcode::TIMESTAMP => self.op_timestamp(frame),
            Opcode::NUMBER => self.op_number(frame),
            Opcode::PREVRANDAO => self.op_prevrandao(frame),
            Opcode::GASLIMIT => self.op_gaslimit(frame),
            Opcode::CHAINID => self.op_chainid(frame),
            Opcode::SELFBALANCE => self.op_selfbalance(frame),
            Opcode::BASEFEE => self.op_basefee(frame),
            Opcode::BLOBHASH => self.op_blobhash(frame),
            Opcode::BLOBBASEFEE => self.op_blobbasefee(frame),
            Opcode::POP => self.op_pop(frame),
            Opcode::MLOAD => self.op_mload(frame),
            Opcode::MSTORE => self.op_mstore(frame),
            Opcode::MSTORE8 => self.op_mstore8(frame),
            Opcode::SLOAD => self.op_sload(frame),
            Opcode::SSTORE => self.op_sstore(frame),
            Opcode::JUMP => self.op_jump(plan, frame),
            Opcode::JUMPI => self.op_jumpi(plan, frame),
            Opcode::PC => self.op_pc(plan, frame),
            Opcode::MSIZE => self.op_msize(frame),
            Opcode::GAS => self.op_gas(frame),
            Opcode::JUMPDEST => self.op_jumpdest(plan, frame),
            Opcode::TLOAD => self.op_tload(frame),
            Opcode::TSTORE => self.op_tstore(frame),
            Opcode::MCOPY => self.op_mcopy(frame),
            Opcode::PUSH0 => self.op_push0(frame),
            // PUSH1..PUSH32 are lowered to PushInline/PushPointer elements
            // and never appear in a stream.
            op if op.push_len().is_some() => Err(VMError::InvalidOpcode),
            op if op.dup_depth().is_some() => {
                let depth = usize::from(op.dup_depth().unwrap_or_default());
                self.op_dup(frame, depth)
            }
            op if op.swap_depth().is_some() => {
                let depth = usize::from(op.swap_depth().unwrap_or_default());
                self.op_swap(frame, depth)
            }
            op if op.log_topic_count().is_some() => {
                let topic_count = usize::from(op.log_topic_count().unwrap_or_default());
                self.op_log(frame, topic_count)
            }
            Opcode::CREATE => self.op_create(frame, false),
            Opcode::CALL => self.op_call(frame),
            Opcode::CALLCODE => self.op_callcode(frame),
            Opcode::RETURN => self.op_return(frame),
            Opcode::DELEGATECALL => self.op_delegatecall(frame),
            Opcode::CREATE2 => self.op_create(frame, true),
            Opcode::STATICCALL => self.op_staticcall(frame),
            Opcode::REVERT => self.op_revert(frame),
            Opcode::INVALID => self.op_invalid(frame),
            Opcode::SELFDESTRUCT => self.op_selfdestruct(frame),
            // The families above are matched by the range guards.
            _ => Err(VMError::InvalidOpcode),
        }
    }
}
