use crate::code::Bytecode;
use crate::errors::VMError;
use crate::gas_cost;
use crate::opcodes::Opcode;
use crate::plan::{fits_inline, HandlerId, Plan, StreamElement};
use rustc_hash::FxHashMap;

/// Planner knobs. Fusion is an optimization only: disabling it must not
/// change anything a frame can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub enable_fusion: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            enable_fusion: true,
        }
    }
}

/// Lowers validated bytecode into the instruction stream in one forward
/// pass: one handler element per opcode, operands inlined next to their
/// handler, PUSH+op pairs fused, and basic-block base-gas sums written into
/// the block-entry operands. Fused jump targets are resolved to stream
/// indices once the pass has recorded every JUMPDEST.
pub struct Planner<'a> {
    code: &'a Bytecode,
    config: PlannerConfig,
}

struct JumpPatch {
    handler_slot: usize,
    operand_slot: usize,
    target_pc: usize,
    conditional: bool,
}

impl<'a> Planner<'a> {
    pub fn new(code: &'a Bytecode) -> Self {
        Self {
            code,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(code: &'a Bytecode, config: PlannerConfig) -> Self {
        Self { code, config }
    }

    pub fn plan(&self) -> Result<Plan, VMError> {
        let code_len = self.code.len();

        let mut stream: Vec<StreamElement> = Vec::new();
        let mut index_to_pc: Vec<usize> = Vec::new();
        // Worst case is two elements per source byte plus the terminal STOP.
        let capacity = code_len.saturating_mul(2).saturating_add(1);
        stream
            .try_reserve(capacity)
            .map_err(|_| VMError::AllocationError)?;
        index_to_pc
            .try_reserve(capacity)
            .map_err(|_| VMError::AllocationError)?;

        let mut constants: Vec<ethereum_types::U256> = Vec::new();
        let mut jumpdest_index: FxHashMap<usize, usize> = FxHashMap::default();
        let mut patches: Vec<JumpPatch> = Vec::new();

        let mut block = BlockTracker::default();

        let mut pc = 0;
        while pc < code_len {
            let opcode = self.code.opcode_at(pc).ok_or(VMError::InvalidOpcode)?;

            if self.code.is_jumpdest(pc) {
                block.close(&mut stream);
                jumpdest_index.insert(pc, stream.len());
                emit(&mut stream, &mut index_to_pc, HandlerId::Op(Opcode::JUMPDEST), pc);
                emit_operand(&mut stream, &mut index_to_pc, 0, pc);
                block.open_at_current_operand(&stream, gas_cost::JUMPDEST);
                pc = pc.wrapping_add(1);
                continue;
            }

            if block.is_closed() {
                emit(&mut stream, &mut index_to_pc, HandlerId::BeginBlock, pc);
                emit_operand(&mut stream, &mut index_to_pc, 0, pc);
                block.open_at_current_operand(&stream, 0);
            }

            if let Some(n_bytes) = opcode.push_len() {
                let value = self.code.push_value_at(pc, n_bytes);
                let next_pc = pc.wrapping_add(n_bytes).wrapping_add(1);

                if let Some(fused) = self.fusable_successor(value, next_pc) {
                    match fused {
                        Opcode::JUMP | Opcode::JUMPI => {
                            let conditional = fused == Opcode::JUMPI;
                            let target_pc = usize::try_from(value).unwrap_or(usize::MAX);
                            let jump_gas = if conditional {
                                gas_cost::JUMPI
                            } else {
                                gas_cost::JUMP
                            };
                            if self.code.is_jumpdest(target_pc) {
                                let handler = if conditional {
                                    HandlerId::PushJumpiPointer
                                } else {
                                    HandlerId::PushJumpPointer
                                };
                                patches.push(JumpPatch {
                                    handler_slot: stream.len(),
                                    operand_slot: stream.len().wrapping_add(1),
                                    target_pc,
                                    conditional,
                                });
                                emit(&mut stream, &mut index_to_pc, handler, pc);
                                emit_operand(&mut stream, &mut index_to_pc, 0, pc);
                            } else {
                                let handler = if conditional {
                                    HandlerId::PushJumpiInvalid
                                } else {
                                    HandlerId::PushJumpInvalid
                                };
                                emit(&mut stream, &mut index_to_pc, handler, pc);
                                emit_operand(&mut stream, &mut index_to_pc, 0, pc);
                            }
                            block.charge(gas_cost::PUSHN.saturating_add(jump_gas));
                            block.close(&mut stream);
                            pc = next_pc.wrapping_add(1);
                            continue;
                        }
                        arith => {
                            let handler = match arith {
                                Opcode::ADD => HandlerId::PushAddInline,
                                Opcode::SUB => HandlerId::PushSubInline,
                                Opcode::MUL => HandlerId::PushMulInline,
                                _ => HandlerId::PushDivInline,
                            };
                            let op_gas = arith.info().base_gas;
                            emit(&mut stream, &mut index_to_pc, handler, pc);
                            emit_operand(
                                &mut stream,
                                &mut index_to_pc,
                                usize::try_from(value).unwrap_or_default(),
                                pc,
                            );
                            block.charge(gas_cost::PUSHN.saturating_add(op_gas));
                            pc = next_pc.wrapping_add(1);
                            continue;
                        }
                    }
                }

                if fits_inline(value) {
                    emit(&mut stream, &mut index_to_pc, HandlerId::PushInline, pc);
                    emit_operand(
                        &mut stream,
                        &mut index_to_pc,
                        usize::try_from(value).unwrap_or_default(),
                        pc,
                    );
                } else {
                    constants
                        .try_reserve(1)
                        .map_err(|_| VMError::AllocationError)?;
                    let pool_index = constants.len();
                    constants.push(value);
                    emit(&mut stream, &mut index_to_pc, HandlerId::PushPointer, pc);
                    emit_operand(&mut stream, &mut index_to_pc, pool_index, pc);
                }
                block.charge(gas_cost::PUSHN);
                pc = next_pc;
                continue;
            }

            match opcode {
                Opcode::PC => {
                    emit(&mut stream, &mut index_to_pc, HandlerId::Op(Opcode::PC), pc);
                    emit_operand(&mut stream, &mut index_to_pc, pc, pc);
                }
                _ => {
                    emit(&mut stream, &mut index_to_pc, HandlerId::Op(opcode), pc);
                }
            }
            block.charge(opcode.info().base_gas);
            if opcode.ends_basic_block() {
                block.close(&mut stream);
            }
            pc = pc.wrapping_add(1);
        }

        block.close(&mut stream);
        // Running off the end of the code terminates as STOP.
        emit(
            &mut stream,
            &mut index_to_pc,
            HandlerId::Op(Opcode::STOP),
            code_len,
        );

        for patch in patches {
            match jumpdest_index.get(&patch.target_pc) {
                Some(&target_index) => {
                    if let Some(slot) = stream.get_mut(patch.operand_slot) {
                        *slot = StreamElement::operand(target_index);
                    }
                }
                None => {
                    let fallback = if patch.conditional {
                        HandlerId::PushJumpiInvalid
                    } else {
                        HandlerId::PushJumpInvalid
                    };
                    if let Some(slot) = stream.get_mut(patch.handler_slot) {
                        *slot = StreamElement::handler(fallback);
                    }
                }
            }
        }

        Ok(Plan::new(stream, constants, jumpdest_index, index_to_pc))
    }

    /// The opcode following a PUSH, when the pair may fuse: fusion enabled,
    /// the immediate fits an element, the successor exists, is one of the
    /// fusable ops, and is not itself a jump destination.
    fn fusable_successor(&self, value: ethereum_types::U256, next_pc: usize) -> Option<Opcode> {
        if !self.config.enable_fusion || !fits_inline(value) {
            return None;
        }
        if self.code.is_jumpdest(next_pc) {
            return None;
        }
        match self.code.opcode_at(next_pc)? {
            op @ (Opcode::ADD
            | Opcode::SUB
            | Opcode::MUL
            | Opcode::DIV
            | Opcode::JUMP
            | Opcode::JUMPI) => Some(op),
            _ => None,
        }
    }
}

fn emit(
    stream: &mut Vec<StreamElement>,
    index_to_pc: &mut Vec<usize>,
    handler: HandlerId,
    pc: usize,
) {
    stream.push(StreamElement::handler(handler));
    index_to_pc.push(pc);
}

fn emit_operand(
    stream: &mut Vec<StreamElement>,
    index_to_pc: &mut Vec<usize>,
    value: usize,
    pc: usize,
) {
    stream.push(StreamElement::operand(value));
    index_to_pc.push(pc);
}

/// Tracks the basic block currently being laid down: where its gas operand
/// lives and the static base gas accumulated so far.
#[derive(Default)]
struct BlockTracker {
    gas_slot: Option<usize>,
    gas: u64,
}

impl BlockTracker {
    fn is_closed(&self) -> bool {
        self.gas_slot.is_none()
    }

    /// Register the last emitted element as this block's gas operand.
    fn open_at_current_operand(&mut self, stream: &[StreamElement], initial_gas: u64) {
        self.gas_slot = stream.len().checked_sub(1);
        self.gas = initial_gas;
    }

    fn charge(&mut self, base_gas: u64) {
        self.gas = self.gas.saturating_add(base_gas);
    }

    fn close(&mut self, stream: &mut [StreamElement]) {
        if let Some(slot) = self.gas_slot.take() {
            if let Some(element) = stream.get_mut(slot) {
                *element = StreamElement::operand(usize::try_from(self.gas).unwrap_or(usize::MAX));
            }
        }
        self.gas = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn plan_hex(raw: &[u8]) -> Plan {
        let code = Bytecode::new(Bytes::copy_from_slice(raw)).unwrap();
        Planner::new(&code).plan().unwrap()
    }

    fn plan_hex_no_fusion(raw: &[u8]) -> Plan {
        let code = Bytecode::new(Bytes::copy_from_slice(raw)).unwrap();
        Planner::with_config(
            &code,
            PlannerConfig {
                enable_fusion: false,
            },
        )
        .plan()
        .unwrap()
    }

    fn handler_at(plan: &Plan, index: usize) -> HandlerId {
        HandlerId::from_index(plan.element(index).unwrap().raw()).unwrap()
    }

    #[test]
    fn empty_code_plans_to_a_single_stop() {
        let plan = plan_hex(&[]);
        assert_eq!(plan.len(), 1);
        assert_eq!(handler_at(&plan, 0), HandlerId::Op(Opcode::STOP));
    }

    #[test]
    fn entry_block_carries_the_static_gas_sum() {
        // PUSH1 5; PUSH1 3; ADD; STOP: 3 + 3 + 3 base gas.
        let plan = plan_hex(&[0x60, 0x05, 0x60, 0x03, 0x01, 0x00]);
        assert_eq!(handler_at(&plan, 0), HandlerId::BeginBlock);
        assert_eq!(plan.operand(1).unwrap(), 9);
    }

    #[test]
    fn push_add_pair_fuses_into_one_element() {
        let fused = plan_hex(&[0x60, 0x05, 0x60, 0x03, 0x01, 0x00]);
        // BeginBlock+operand, PushInline+operand, PushAddInline+operand, STOP,
        // implicit STOP.
        assert_eq!(fused.len(), 8);
        assert_eq!(handler_at(&fused, 2), HandlerId::PushInline);
        assert_eq!(fused.operand(3).unwrap(), 5);
        assert_eq!(handler_at(&fused, 4), HandlerId::PushAddInline);
        assert_eq!(fused.operand(5).unwrap(), 3);

        let unfused = plan_hex_no_fusion(&[0x60, 0x05, 0x60, 0x03, 0x01, 0x00]);
        assert_eq!(handler_at(&unfused, 4), HandlerId::PushInline);
        assert_eq!(handler_at(&unfused, 6), HandlerId::Op(Opcode::ADD));
        // Same static gas either way.
        assert_eq!(unfused.operand(1).unwrap(), 9);
    }

    #[test]
    fn fused_jump_resolves_to_the_jumpdest_element() {
        // PUSH1 4; JUMP; STOP; JUMPDEST; PUSH1 42; STOP
        let plan = plan_hex(&[0x60, 0x04, 0x56, 0x00, 0x5B, 0x60, 0x2A, 0x00]);
        assert_eq!(handler_at(&plan, 2), HandlerId::PushJumpPointer);
        let target = plan.operand(3).unwrap();
        assert_eq!(handler_at(&plan, target), HandlerId::Op(Opcode::JUMPDEST));
        assert_eq!(plan.jump_target(4), Some(target));
    }

    #[test]
    fn fused_jump_to_non_jumpdest_plans_to_a_trap() {
        // PUSH1 3; JUMP; STOP: position 3 is STOP, not JUMPDEST.
        let plan = plan_hex(&[0x60, 0x03, 0x56, 0x00]);
        assert_eq!(handler_at(&plan, 2), HandlerId::PushJumpInvalid);
    }

    #[test]
    fn wide_immediates_go_to_the_constants_pool() {
        let mut raw = vec![0x7F];
        raw.extend_from_slice(&[0xAB; 32]);
        raw.push(0x00);
        let plan = plan_hex(&raw);
        assert_eq!(handler_at(&plan, 2), HandlerId::PushPointer);
        let pool_index = plan.operand(3).unwrap();
        assert_eq!(
            plan.constant(pool_index).unwrap(),
            ethereum_types::U256::from_big_endian(&[0xAB; 32])
        );
    }

    #[test]
    fn jumpdest_opens_a_block_with_its_own_gas_sum() {
        // JUMPDEST; PUSH1 1; PUSH1 0; JUMP: 1 + 3 + 3 + 8 = 15.
        let plan = plan_hex(&[0x5B, 0x60, 0x01, 0x60, 0x00, 0x56]);
        assert_eq!(handler_at(&plan, 0), HandlerId::Op(Opcode::JUMPDEST));
        assert_eq!(plan.operand(1).unwrap(), 15);
        assert_eq!(plan.jump_target(0), Some(0));
    }

    #[test]
    fn fallthrough_after_jumpi_starts_a_fresh_block() {
        // PUSH1 0; PUSH1 8; JUMPI; PUSH1 1; POP; STOP; ...; JUMPDEST; STOP
        let plan = plan_hex(&[0x60, 0x00, 0x60, 0x08, 0x57, 0x60, 0x01, 0x50, 0x5B, 0x00]);
        // Find a second BeginBlock after the fused JUMPI.
        let mut begin_blocks = 0;
        let mut index = 0;
        while index < plan.len() {
            let handler = handler_at(&plan, index);
            if handler == HandlerId::BeginBlock {
                begin_blocks += 1;
            }
            index += handler.width();
        }
        assert_eq!(begin_blocks, 2);
    }

    #[test]
    fn pc_elements_carry_their_source_offset() {
        // PUSH1 7; PC; STOP: PC sits at source offset 2.
        let plan = plan_hex(&[0x60, 0x07, 0x58, 0x00]);
        assert_eq!(handler_at(&plan, 4), HandlerId::Op(Opcode::PC));
        assert_eq!(plan.operand(5).unwrap(), 2);
        assert_eq!(plan.pc_at(4), 2);
    }
}
