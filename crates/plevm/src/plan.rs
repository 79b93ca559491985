use crate::errors::VMError;
use crate::gas_cost;
use crate::opcodes::{Opcode, OpcodeCategory, OpcodeInfo};
use ethereum_types::U256;
use rustc_hash::FxHashMap;

/// One element of the instruction stream: a machine word holding either a
/// handler id or inline operand data (a small immediate, a source PC, a gas
/// sum, or an index into the stream / constants pool). Which one it is
/// follows from the position: handlers know the width and layout of their
/// own elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamElement(usize);

impl StreamElement {
    pub fn handler(id: HandlerId) -> Self {
        Self(id.index())
    }

    pub fn operand(value: usize) -> Self {
        Self(value)
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

/// Immediates wider than one element go to the constants pool instead.
pub fn fits_inline(value: U256) -> bool {
    value.bits() <= usize::BITS.try_into().unwrap_or(64)
}

/// Identity of an instruction-stream handler: one of the 256 table opcodes,
/// or a synthetic opcode produced by the planner (block-entry gas checks,
/// lowered PUSHes, fused PUSH+op pairs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerId {
    Op(Opcode),
    /// Verifies the enclosing basic block's static gas; operand = gas sum.
    BeginBlock,
    /// PUSH whose immediate fits in an element; operand = immediate.
    PushInline,
    /// PUSH routed through the constants pool; operand = pool index.
    PushPointer,
    /// Fused PUSH+ADD; operand = immediate.
    PushAddInline,
    /// Fused PUSH+SUB (immediate minus top); operand = immediate.
    PushSubInline,
    /// Fused PUSH+MUL; operand = immediate.
    PushMulInline,
    /// Fused PUSH+DIV (immediate over top); operand = immediate.
    PushDivInline,
    /// Fused PUSH+JUMP with a plan-time resolved target; operand = stream
    /// index of the destination JUMPDEST.
    PushJumpPointer,
    /// Fused PUSH+JUMP whose constant target is no JUMPDEST; always traps.
    PushJumpInvalid,
    /// Fused PUSH+JUMPI, resolved; operand = stream index.
    PushJumpiPointer,
    /// Fused PUSH+JUMPI whose target is no JUMPDEST; traps when taken.
    PushJumpiInvalid,
}

const SYNTHETIC_BASE: usize = 0x100;

impl HandlerId {
    pub fn index(self) -> usize {
        match self {
            HandlerId::Op(op) => usize::from(op.to_byte()),
            HandlerId::BeginBlock => SYNTHETIC_BASE,
            HandlerId::PushInline => SYNTHETIC_BASE.wrapping_add(1),
            HandlerId::PushPointer => SYNTHETIC_BASE.wrapping_add(2),
            HandlerId::PushAddInline => SYNTHETIC_BASE.wrapping_add(3),
            HandlerId::PushSubInline => SYNTHETIC_BASE.wrapping_add(4),
            HandlerId::PushMulInline => SYNTHETIC_BASE.wrapping_add(5),
            HandlerId::PushDivInline => SYNTHETIC_BASE.wrapping_add(6),
            HandlerId::PushJumpPointer => SYNTHETIC_BASE.wrapping_add(7),
            HandlerId::PushJumpInvalid => SYNTHETIC_BASE.wrapping_add(8),
            HandlerId::PushJumpiPointer => SYNTHETIC_BASE.wrapping_add(9),
            HandlerId::PushJumpiInvalid => SYNTHETIC_BASE.wrapping_add(10),
        }
    }

    pub fn from_index(raw: usize) -> Option<Self> {
        if let Some(offset) = raw.checked_sub(SYNTHETIC_BASE) {
            return match offset {
                0 => Some(HandlerId::BeginBlock),
                1 => Some(HandlerId::PushInline),
                2 => Some(HandlerId::PushPointer),
                3 => Some(HandlerId::PushAddInline),
                4 => Some(HandlerId::PushSubInline),
                5 => Some(HandlerId::PushMulInline),
                6 => Some(HandlerId::PushDivInline),
                7 => Some(HandlerId::PushJumpPointer),
                8 => Some(HandlerId::PushJumpInvalid),
                9 => Some(HandlerId::PushJumpiPointer),
                10 => Some(HandlerId::PushJumpiInvalid),
                _ => None,
            };
        }
        u8::try_from(raw).ok().and_then(Opcode::from_byte).map(HandlerId::Op)
    }

    /// Number of stream elements this instruction occupies (handler plus
    /// inline operands).
    pub fn width(self) -> usize {
        match self {
            HandlerId::Op(Opcode::JUMPDEST | Opcode::PC) => 2,
            HandlerId::Op(_) => 1,
            _ => 2,
        }
    }

    /// Metadata the dispatch loop pre-checks against. For fused pairs this
    /// is the combined footprint of both source instructions.
    pub fn info(self) -> OpcodeInfo {
        match self {
            HandlerId::Op(op) => op.info(),
            HandlerId::BeginBlock => OpcodeInfo {
                base_gas: 0,
                min_stack: 0,
                stack_delta: 0,
                category: OpcodeCategory::Control,
            },
            HandlerId::PushInline | HandlerId::PushPointer => OpcodeInfo {
                base_gas: gas_cost::PUSHN,
                min_stack: 0,
                stack_delta: 1,
                category: OpcodeCategory::Push,
            },
            HandlerId::PushAddInline => fused_arith_info(gas_cost::ADD),
            HandlerId::PushSubInline => fused_arith_info(gas_cost::SUB),
            HandlerId::PushMulInline => fused_arith_info(gas_cost::MUL),
            HandlerId::PushDivInline => fused_arith_info(gas_cost::DIV),
            HandlerId::PushJumpPointer | HandlerId::PushJumpInvalid => OpcodeInfo {
                base_gas: gas_cost::PUSHN.saturating_add(gas_cost::JUMP),
                min_stack: 0,
                stack_delta: 0,
                category: OpcodeCategory::Control,
            },
            HandlerId::PushJumpiPointer | HandlerId::PushJumpiInvalid => OpcodeInfo {
                base_gas: gas_cost::PUSHN.saturating_add(gas_cost::JUMPI),
                min_stack: 1,
                stack_delta: -1,
                category: OpcodeCategory::Control,
            },
        }
    }
}

fn fused_arith_info(op_gas: u64) -> OpcodeInfo {
    OpcodeInfo {
        base_gas: gas_cost::PUSHN.saturating_add(op_gas),
        min_stack: 1,
        stack_delta: 0,
        category: OpcodeCategory::Arithmetic,
    }
}

/// The planner's output: a random-access view of the instruction stream,
/// the wide-immediate pool, and the PC↔index mappings. Immutable once built;
/// outlives every frame that executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    stream: Vec<StreamElement>,
    constants: Vec<U256>,
    jumpdest_index: FxHashMap<usize, usize>,
    index_to_pc: Vec<usize>,
}

impl Plan {
    pub(crate) fn new(
        stream: Vec<StreamElement>,
        constants: Vec<U256>,
        jumpdest_index: FxHashMap<usize, usize>,
        index_to_pc: Vec<usize>,
    ) -> Self {
        Self {
            stream,
            constants,
            jumpdest_index,
            index_to_pc,
        }
    }

    pub fn stream(&self) -> &[StreamElement] {
        &self.stream
    }

    pub fn len(&self) -> usize {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    pub fn element(&self, index: usize) -> Option<StreamElement> {
        self.stream.get(index).copied()
    }

    /// Inline operand stored at `index` (the slot after a handler element).
    pub fn operand(&self, index: usize) -> Result<usize, VMError> {
        self.stream
            .get(index)
            .map(|element| element.raw())
            .ok_or(VMError::OutOfBounds)
    }

    pub fn constant(&self, pool_index: usize) -> Result<U256, VMError> {
        self.constants
            .get(pool_index)
            .copied()
            .ok_or(VMError::OutOfBounds)
    }

    pub fn constants(&self) -> &[U256] {
        &self.constants
    }

    /// Stream index of the JUMPDEST at source `pc`, if there is one. Doubles
    /// as the runtime jump-validity test.
    pub fn jump_target(&self, pc: usize) -> Option<usize> {
        self.jumpdest_index.get(&pc).copied()
    }

    /// Source PC the element at `index` was lowered from.
    pub fn pc_at(&self, index: usize) -> usize {
        self.index_to_pc.get(index).copied().unwrap_or_default()
    }
}
