use crate::gas_cost;

/// Closed set of legacy-bytecode opcodes. Any byte outside this enumeration
/// is rejected by the bytecode validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Opcode {
    // Stop and Arithmetic Operations
    STOP = 0x00,
    ADD = 0x01,
    MUL = 0x02,
    SUB = 0x03,
    DIV = 0x04,
    SDIV = 0x05,
    MOD = 0x06,
    SMOD = 0x07,
    ADDMOD = 0x08,
    MULMOD = 0x09,
    EXP = 0x0A,
    SIGNEXTEND = 0x0B,

    // Comparison & Bitwise Logic Operations
    LT = 0x10,
    GT = 0x11,
    SLT = 0x12,
    SGT = 0x13,
    EQ = 0x14,
    ISZERO = 0x15,
    AND = 0x16,
    OR = 0x17,
    XOR = 0x18,
    NOT = 0x19,
    BYTE = 0x1A,
    SHL = 0x1B,
    SHR = 0x1C,
    SAR = 0x1D,

    // KECCAK256
    KECCAK256 = 0x20,

    // Environmental Information
    ADDRESS = 0x30,
    BALANCE = 0x31,
    ORIGIN = 0x32,
    CALLER = 0x33,
    CALLVALUE = 0x34,
    CALLDATALOAD = 0x35,
    CALLDATASIZE = 0x36,
    CALLDATACOPY = 0x37,
    CODESIZE = 0x38,
    CODECOPY = 0x39,
    GASPRICE = 0x3A,
    EXTCODESIZE = 0x3B,
    EXTCODECOPY = 0x3C,
    RETURNDATASIZE = 0x3D,
    RETURNDATACOPY = 0x3E,
    EXTCODEHASH = 0x3F,

    // Block Information
    BLOCKHASH = 0x40,
    COINBASE = 0x41,
    TIMESTAMP = 0x42,
    NUMBER = 0x43,
    PREVRANDAO = 0x44,
    GASLIMIT = 0x45,
    CHAINID = 0x46,
    SELFBALANCE = 0x47,
    BASEFEE = 0x48,
    BLOBHASH = 0x49,
    BLOBBASEFEE = 0x4A,

    // Stack, Memory, Storage, and Flow Operations
    POP = 0x50,
    MLOAD = 0x51,
    MSTORE = 0x52,
    MSTORE8 = 0x53,
    SLOAD = 0x54,
    SSTORE = 0x55,
    JUMP = 0x56,
    JUMPI = 0x57,
    PC = 0x58,
    MSIZE = 0x59,
    GAS = 0x5A,
    JUMPDEST = 0x5B,
    TLOAD = 0x5C,
    TSTORE = 0x5D,
    MCOPY = 0x5E,

    // Push Operations
    PUSH0 = 0x5F,
    PUSH1 = 0x60,
    PUSH2 = 0x61,
    PUSH3 = 0x62,
    PUSH4 = 0x63,
    PUSH5 = 0x64,
    PUSH6 = 0x65,
    PUSH7 = 0x66,
    PUSH8 = 0x67,
    PUSH9 = 0x68,
    PUSH10 = 0x69,
    PUSH11 = 0x6A,
    PUSH12 = 0x6B,
    PUSH13 = 0x6C,
    PUSH14 = 0x6D,
    PUSH15 = 0x6E,
    PUSH16 = 0x6F,
    PUSH17 = 0x70,
    PUSH18 = 0x71,
    PUSH19 = 0x72,
    PUSH20 = 0x73,
    PUSH21 = 0x74,
    PUSH22 = 0x75,
    PUSH23 = 0x76,
    PUSH24 = 0x77,
    PUSH25 = 0x78,
    PUSH26 = 0x79,
    PUSH27 = 0x7A,
    PUSH28 = 0x7B,
    PUSH29 = 0x7C,
    PUSH30 = 0x7D,
    PUSH31 = 0x7E,
    PUSH32 = 0x7F,

    // Duplication Operations
    DUP1 = 0x80,
    DUP2 = 0x81,
    DUP3 = 0x82,
    DUP4 = 0x83,
    DUP5 = 0x84,
    DUP6 = 0x85,
    DUP7 = 0x86,
    DUP8 = 0x87,
    DUP9 = 0x88,
    DUP10 = 0x89,
    DUP11 = 0x8A,
    DUP12 = 0x8B,
    DUP13 = 0x8C,
    DUP14 = 0x8D,
    DUP15 = 0x8E,
    DUP16 = 0x8F,

    // Exchange Operations
    SWAP1 = 0x90,
    SWAP2 = 0x91,
    SWAP3 = 0x92,
    SWAP4 = 0x93,
    SWAP5 = 0x94,
    SWAP6 = 0x95,
    SWAP7 = 0x96,
    SWAP8 = 0x97,
    SWAP9 = 0x98,
    SWAP10 = 0x99,
    SWAP11 = 0x9A,
    SWAP12 = 0x9B,
    SWAP13 = 0x9C,
    SWAP14 = 0x9D,
    SWAP15 = 0x9E,
    SWAP16 = 0x9F,

    // Logging Operations
    LOG0 = 0xA0,
    LOG1 = 0xA1,
    LOG2 = 0xA2,
    LOG3 = 0xA3,
    LOG4 = 0xA4,

    // System Operations
    CREATE = 0xF0,
    CALL = 0xF1,
    CALLCODE = 0xF2,
    RETURN = 0xF3,
    DELEGATECALL = 0xF4,
    CREATE2 = 0xF5,
    STATICCALL = 0xFA,
    REVERT = 0xFD,
    INVALID = 0xFE,
    SELFDESTRUCT = 0xFF,
}

/// Category tag for an opcode, as carried by the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeCategory {
    Arithmetic,
    Bitwise,
    Comparison,
    Stack,
    Memory,
    Storage,
    Control,
    System,
    Push,
    Dup,
    Swap,
    Log,
}

/// Static metadata for one opcode: the gas charged unconditionally, the
/// stack depth it requires, and the net change it applies to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub base_gas: u64,
    pub min_stack: u8,
    pub stack_delta: i8,
    pub category: OpcodeCategory,
}

impl OpcodeInfo {
    const fn new(base_gas: u64, min_stack: u8, stack_delta: i8, category: OpcodeCategory) -> Self {
        Self {
            base_gas,
            min_stack,
            stack_delta,
            category,
        }
    }
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        let opcode = match byte {
            0x00 => Opcode::STOP,
            0x01 => Opcode::ADD,
            0x02 => Opcode::MUL,
            0x03 => Opcode::SUB,
            0x04 => Opcode::DIV,
            0x05 => Opcode::SDIV,
            0x06 => Opcode::MOD,
            0x07 => Opcode::SMOD,
            0x08 => Opcode::ADDMOD,
            0x09 => Opcode::MULMOD,
            0x0A => Opcode::EXP,
            0x0B => Opcode::SIGNEXTEND,
            0x10 => Opcode::LT,
            0x11 => Opcode::GT,
            0x12 => Opcode::SLT,
            0x13 => Opcode::SGT,
            0x14 => Opcode::EQ,
            0x15 => Opcode::ISZERO,
            0x16 => Opcode::AND,
            0x17 => Opcode::OR,
            0x18 => Opcode::XOR,
            0x19 => Opcode::NOT,
            0x1A => Opcode::BYTE,
            0x1B => Opcode::SHL,
            0x1C => Opcode::SHR,
            0x1D => Opcode::SAR,
            0x20 => Opcode::KECCAK256,
            0x30 => Opcode::ADDRESS,
            0x31 => Opcode::BALANCE,
            0x32 => Opcode::ORIGIN,
            0x33 => Opcode::CALLER,
            0x34 => Opcode::CALLVALUE,
            0x35 => Opcode::CALLDATALOAD,
            0x36 => Opcode::CALLDATASIZE,
            0x37 => Opcode::CALLDATACOPY,
            0x38 => Opcode::CODESIZE,
            0x39 => Opcode::CODECOPY,
            0x3A => Opcode::GASPRICE,
            0x3B => Opcode::EXTCODESIZE,
            0x3C => Opcode::EXTCODECOPY,
            0x3D => Opcode::RETURNDATASIZE,
            0x3E => Opcode::RETURNDATACOPY,
            0x3F => Opcode::EXTCODEHASH,
            0x40 => Opcode::BLOCKHASH,
            0x41 => Opcode::COINBASE,
            0x42 => Opcode::TIMESTAMP,
            0x43 => Opcode::NUMBER,
            0x44 => Opcode::PREVRANDAO,
            0x45 => Opcode::GASLIMIT,
            0x46 => Opcode::CHAINID,
            0x47 => Opcode::SELFBALANCE,
            0x48 => Opcode::BASEFEE,
            0x49 => Opcode::BLOBHASH,
            0x4A => Opcode::BLOBBASEFEE,
            0x50 => Opcode::POP,
            0x51 => Opcode::MLOAD,
            0x52 => Opcode::MSTORE,
            0x53 => Opcode::MSTORE8,
            0x54 => Opcode::SLOAD,
            0x55 => Opcode::SSTORE,
            0x56 => Opcode::JUMP,
            0x57 => Opcode::JUMPI,
            0x58 => Opcode::PC,
            0x59 => Opcode::MSIZE,
            0x5A => Opcode::GAS,
            0x5B => Opcode::JUMPDEST,
            0x5C => Opcode::TLOAD,
            0x5D => Opcode::TSTORE,
            0x5E => Opcode::MCOPY,
            0x5F => Opcode::PUSH0,
            0x60 => Opcode::PUSH1,
            0x61 => Opcode::PUSH2,
            0x62 => Opcode::PUSH3,
            0x63 => Opcode::PUSH4,
            0x64 => Opcode::PUSH5,
            0x65 => Opcode::PUSH6,
            0x66 => Opcode::PUSH7,
            0x67 => Opcode::PUSH8,
            0x68 => Opcode::PUSH9,
            0x69 => Opcode::PUSH10,
            0x6A => Opcode::PUSH11,
            0x6B => Opcode::PUSH12,
            0x6C => Opcode::PUSH13,
            0x6D => Opcode::PUSH14,
            0x6E => Opcode::PUSH15,
            0x6F => Opcode::PUSH16,
            0x70 => Opcode::PUSH17,
            0x71 => Opcode::PUSH18,
            0x72 => Opcode::PUSH19,
            0x73 => Opcode::PUSH20,
            0x74 => Opcode::PUSH21,
            0x75 => Opcode::PUSH22,
            0x76 => Opcode::PUSH23,
            0x77 => Opcode::PUSH24,
            0x78 => Opcode::PUSH25,
            0x79 => Opcode::PUSH26,
            0x7A => Opcode::PUSH27,
            0x7B => Opcode::PUSH28,
            0x7C => Opcode::PUSH29,
            0x7D => Opcode::PUSH30,
            0x7E => Opcode::PUSH31,
            0x7F => Opcode::PUSH32,
            0x80 => Opcode::DUP1,
            0x81 => Opcode::DUP2,
            0x82 => Opcode::DUP3,
            0x83 => Opcode::DUP4,
            0x84 => Opcode::DUP5,
            0x85 => Opcode::DUP6,
            0x86 => Opcode::DUP7,
            0x87 => Opcode::DUP8,
            0x88 => Opcode::DUP9,
            0x89 => Opcode::DUP10,
            0x8A => Opcode::DUP11,
            0x8B => Opcode::DUP12,
            0x8C => Opcode::DUP13,
            0x8D => Opcode::DUP14,
            0x8E => Opcode::DUP15,
            0x8F => Opcode::DUP16,
            0x90 => Opcode::SWAP1,
            0x91 => Opcode::SWAP2,
            0x92 => Opcode::SWAP3,
            0x93 => Opcode::SWAP4,
            0x94 => Opcode::SWAP5,
            0x95 => Opcode::SWAP6,
            0x96 => Opcode::SWAP7,
            0x97 => Opcode::SWAP8,
            0x98 => Opcode::SWAP9,
            0x99 => Opcode::SWAP10,
            0x9A => Opcode::SWAP11,
            0x9B => Opcode::SWAP12,
            0x9C => Opcode::SWAP13,
            0x9D => Opcode::SWAP14,
            0x9E => Opcode::SWAP15,
            0x9F => Opcode::SWAP16,
            0xA0 => Opcode::LOG0,
            0xA1 => Opcode::LOG1,
            0xA2 => Opcode::LOG2,
            0xA3 => Opcode::LOG3,
            0xA4 => Opcode::LOG4,
            0xF0 => Opcode::CREATE,
            0xF1 => Opcode::CALL,
            0xF2 => Opcode::CALLCODE,
            0xF3 => Opcode::RETURN,
            0xF4 => Opcode::DELEGATECALL,
            0xF5 => Opcode::CREATE2,
            0xFA => Opcode::STATICCALL,
            0xFD => Opcode::REVERT,
            0xFE => Opcode::INVALID,
            0xFF => Opcode::SELFDESTRUCT,
            _ => return None,
        };
        Some(opcode)
    }

    #[allow(clippy::as_conversions)]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Number of immediate bytes following a PUSH1..PUSH32, `None` otherwise.
    /// PUSH0 carries no immediate and is not reported here.
    pub fn push_len(self) -> Option<usize> {
        let byte = self.to_byte();
        if (Opcode::PUSH1.to_byte()..=Opcode::PUSH32.to_byte()).contains(&byte) {
            let len = byte.wrapping_sub(Opcode::PUSH1.to_byte()).wrapping_add(1);
            Some(usize::from(len))
        } else {
            None
        }
    }

    pub fn is_push(self) -> bool {
        self == Opcode::PUSH0 || self.push_len().is_some()
    }

    /// Opcodes after which control never falls through to the next byte.
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::STOP
                | Opcode::RETURN
                | Opcode::REVERT
                | Opcode::INVALID
                | Opcode::SELFDESTRUCT
        )
    }

    /// Opcodes that end a basic block: terminators plus the jumps.
    pub fn ends_basic_block(self) -> bool {
        self.is_terminator() || matches!(self, Opcode::JUMP | Opcode::JUMPI)
    }

    /// Static metadata: base gas, required stack depth, stack delta, category.
    pub fn info(self) -> OpcodeInfo {
        use OpcodeCategory::*;
        match self {
            Opcode::STOP => OpcodeInfo::new(0, 0, 0, Control),
            Opcode::ADD => OpcodeInfo::new(gas_cost::ADD, 2, -1, Arithmetic),
            Opcode::MUL => OpcodeInfo::new(gas_cost::MUL, 2, -1, Arithmetic),
            Opcode::SUB => OpcodeInfo::new(gas_cost::SUB, 2, -1, Arithmetic),
            Opcode::DIV => OpcodeInfo::new(gas_cost::DIV, 2, -1, Arithmetic),
            Opcode::SDIV => OpcodeInfo::new(gas_cost::SDIV, 2, -1, Arithmetic),
            Opcode::MOD => OpcodeInfo::new(gas_cost::MOD, 2, -1, Arithmetic),
            Opcode::SMOD => OpcodeInfo::new(gas_cost::SMOD, 2, -1, Arithmetic),
            Opcode::ADDMOD => OpcodeInfo::new(gas_cost::ADDMOD, 3, -2, Arithmetic),
            Opcode::MULMOD => OpcodeInfo::new(gas_cost::MULMOD, 3, -2, Arithmetic),
            Opcode::EXP => OpcodeInfo::new(gas_cost::EXP_STATIC, 2, -1, Arithmetic),
            Opcode::SIGNEXTEND => OpcodeInfo::new(gas_cost::SIGNEXTEND, 2, -1, Arithmetic),
            Opcode::LT => OpcodeInfo::new(gas_cost::LT, 2, -1, Comparison),
            Opcode::GT => OpcodeInfo::new(gas_cost::GT, 2, -1, Comparison),
            Opcode::SLT => OpcodeInfo::new(gas_cost::SLT, 2, -1, Comparison),
            Opcode::SGT => OpcodeInfo::new(gas_cost::SGT, 2, -1, Comparison),
            Opcode::EQ => OpcodeInfo::new(gas_cost::EQ, 2, -1, Comparison),
            Opcode::ISZERO => OpcodeInfo::new(gas_cost::ISZERO, 1, 0, Comparison),
            Opcode::AND => OpcodeInfo::new(gas_cost::AND, 2, -1, Bitwise),
            Opcode::OR => OpcodeInfo::new(gas_cost::OR, 2, -1, Bitwise),
            Opcode::XOR => OpcodeInfo::new(gas_cost::XOR, 2, -1, Bitwise),
            Opcode::NOT => OpcodeInfo::new(gas_cost::NOT, 1, 0, Bitwise),
            Opcode::BYTE => OpcodeInfo::new(gas_cost::BYTE, 2, -1, Bitwise),
            Opcode::SHL => OpcodeInfo::new(gas_cost::SHL, 2, -1, Bitwise),
            Opcode::SHR => OpcodeInfo::new(gas_cost::SHR, 2, -1, Bitwise),
            Opcode::SAR => OpcodeInfo::new(gas_cost::SAR, 2, -1, Bitwise),
            Opcode::KECCAK256 => OpcodeInfo::new(gas_cost::KECCAK256_STATIC, 2, -1, Arithmetic),
            Opcode::ADDRESS => OpcodeInfo::new(gas_cost::ADDRESS, 0, 1, System),
            Opcode::BALANCE => OpcodeInfo::new(gas_cost::BALANCE, 1, 0, System),
            Opcode::ORIGIN => OpcodeInfo::new(gas_cost::ORIGIN, 0, 1, System),
            Opcode::CALLER => OpcodeInfo::new(gas_cost::CALLER, 0, 1, System),
            Opcode::CALLVALUE => OpcodeInfo::new(gas_cost::CALLVALUE, 0, 1, System),
            Opcode::CALLDATALOAD => OpcodeInfo::new(gas_cost::CALLDATALOAD, 1, 0, System),
            Opcode::CALLDATASIZE => OpcodeInfo::new(gas_cost::CALLDATASIZE, 0, 1, System),
            Opcode::CALLDATACOPY => OpcodeInfo::new(gas_cost::CALLDATACOPY_STATIC, 3, -3, System),
            Opcode::CODESIZE => OpcodeInfo::new(gas_cost::CODESIZE, 0, 1, System),
            Opcode::CODECOPY => OpcodeInfo::new(gas_cost::CODECOPY_STATIC, 3, -3, System),
            Opcode::GASPRICE => OpcodeInfo::new(gas_cost::GASPRICE, 0, 1, System),
            Opcode::EXTCODESIZE => OpcodeInfo::new(gas_cost::EXTCODESIZE, 1, 0, System),
            Opcode::EXTCODECOPY => OpcodeInfo::new(gas_cost::EXTCODECOPY_STATIC, 4, -4, System),
            Opcode::RETURNDATASIZE => OpcodeInfo::new(gas_cost::RETURNDATASIZE, 0, 1, System),
            Opcode::RETURNDATACOPY => {
                OpcodeInfo::new(gas_cost::RETURNDATACOPY_STATIC, 3, -3, System)
            }
            Opcode::EXTCODEHASH => OpcodeInfo::new(gas_cost::EXTCODEHASH, 1, 0, System),
            Opcode::BLOCKHASH => OpcodeInfo::new(gas_cost::BLOCKHASH, 1, 0, System),
            Opcode::COINBASE => OpcodeInfo::new(gas_cost::COINBASE, 0, 1, System),
            Opcode::TIMESTAMP => OpcodeInfo::new(gas_cost::TIMESTAMP, 0, 1, System),
            Opcode::NUMBER => OpcodeInfo::new(gas_cost::NUMBER, 0, 1, System),
            Opcode::PREVRANDAO => OpcodeInfo::new(gas_cost::PREVRANDAO, 0, 1, System),
            Opcode::GASLIMIT => OpcodeInfo::new(gas_cost::GASLIMIT, 0, 1, System),
            Opcode::CHAINID => OpcodeInfo::new(gas_cost::CHAINID, 0, 1, System),
            Opcode::SELFBALANCE => OpcodeInfo::new(gas_cost::SELFBALANCE, 0, 1, System),
            Opcode::BASEFEE => OpcodeInfo::new(gas_cost::BASEFEE, 0, 1, System),
            Opcode::BLOBHASH => OpcodeInfo::new(gas_cost::BLOBHASH, 1, 0, System),
            Opcode::BLOBBASEFEE => OpcodeInfo::new(gas_cost::BLOBBASEFEE, 0, 1, System),
            Opcode::POP => OpcodeInfo::new(gas_cost::POP, 1, -1, Stack),
            Opcode::MLOAD => OpcodeInfo::new(gas_cost::MLOAD_STATIC, 1, 0, Memory),
            Opcode::MSTORE => OpcodeInfo::new(gas_cost::MSTORE_STATIC, 2, -2, Memory),
            Opcode::MSTORE8 => OpcodeInfo::new(gas_cost::MSTORE8_STATIC, 2, -2, Memory),
            Opcode::SLOAD => OpcodeInfo::new(gas_cost::SLOAD, 1, 0, Storage),
            Opcode::SSTORE => OpcodeInfo::new(0, 2, -2, Storage),
            Opcode::JUMP => OpcodeInfo::new(gas_cost::JUMP, 1, -1, Control),
            Opcode::JUMPI => OpcodeInfo::new(gas_cost::JUMPI, 2, -2, Control),
            Opcode::PC => OpcodeInfo::new(gas_cost::PC, 0, 1, Control),
            Opcode::MSIZE => OpcodeInfo::new(gas_cost::MSIZE, 0, 1, Memory),
            Opcode::GAS => OpcodeInfo::new(gas_cost::GAS, 0, 1, Control),
            Opcode::JUMPDEST => OpcodeInfo::new(gas_cost::JUMPDEST, 0, 0, Control),
            Opcode::TLOAD => OpcodeInfo::new(gas_cost::TLOAD, 1, 0, Storage),
            Opcode::TSTORE => OpcodeInfo::new(gas_cost::TSTORE, 2, -2, Storage),
            Opcode::MCOPY => OpcodeInfo::new(gas_cost::MCOPY_STATIC, 3, -3, Memory),
            Opcode::PUSH0 => OpcodeInfo::new(gas_cost::PUSH0, 0, 1, Push),
            op if op.push_len().is_some() => OpcodeInfo::new(gas_cost::PUSHN, 0, 1, Push),
            op if op.dup_depth().is_some() => {
                let depth = op.dup_depth().unwrap_or_default();
                OpcodeInfo::new(gas_cost::DUPN, depth, 1, Dup)
            }
            op if op.swap_depth().is_some() => {
                let depth = op.swap_depth().unwrap_or_default().saturating_add(1);
                OpcodeInfo::new(gas_cost::SWAPN, depth, 0, Swap)
            }
            op if op.log_topic_count().is_some() => {
                let topics = op.log_topic_count().unwrap_or_default();
                let min = topics.saturating_add(2);
                let delta = match min {
                    2 => -2,
                    3 => -3,
                    4 => -4,
                    5 => -5,
                    _ => -6,
                };
                OpcodeInfo::new(gas_cost::LOGN_STATIC, min, delta, Log)
            }
            Opcode::CREATE => OpcodeInfo::new(gas_cost::CREATE_BASE, 3, -2, System),
            Opcode::CALL => OpcodeInfo::new(gas_cost::CALL_BASE, 7, -6, System),
            Opcode::CALLCODE => OpcodeInfo::new(gas_cost::CALL_BASE, 7, -6, System),
            Opcode::RETURN => OpcodeInfo::new(0, 2, -2, Control),
            Opcode::DELEGATECALL => OpcodeInfo::new(gas_cost::CALL_BASE, 6, -5, System),
            Opcode::CREATE2 => OpcodeInfo::new(gas_cost::CREATE_BASE, 4, -3, System),
            Opcode::STATICCALL => OpcodeInfo::new(gas_cost::CALL_BASE, 6, -5, System),
            Opcode::REVERT => OpcodeInfo::new(0, 2, -2, Control),
            Opcode::INVALID => OpcodeInfo::new(0, 0, 0, Control),
            Opcode::SELFDESTRUCT => OpcodeInfo::new(gas_cost::SELFDESTRUCT_STATIC, 1, -1, System),
            // PUSH/DUP/SWAP/LOG families are covered by the guards above.
            _ => OpcodeInfo::new(0, 0, 0, Control),
        }
    }

    /// `DUP1..DUP16` depth (1-based), `None` otherwise.
    pub fn dup_depth(self) -> Option<u8> {
        let byte = self.to_byte();
        if (Opcode::DUP1.to_byte()..=Opcode::DUP16.to_byte()).contains(&byte) {
            Some(byte.wrapping_sub(Opcode::DUP1.to_byte()).wrapping_add(1))
        } else {
            None
        }
    }

    /// `SWAP1..SWAP16` depth (1-based), `None` otherwise.
    pub fn swap_depth(self) -> Option<u8> {
        let byte = self.to_byte();
        if (Opcode::SWAP1.to_byte()..=Opcode::SWAP16.to_byte()).contains(&byte) {
            Some(byte.wrapping_sub(Opcode::SWAP1.to_byte()).wrapping_add(1))
        } else {
            None
        }
    }

    /// `LOG0..LOG4` topic count, `None` otherwise.
    pub fn log_topic_count(self) -> Option<u8> {
        let byte = self.to_byte();
        if (Opcode::LOG0.to_byte()..=Opcode::LOG4.to_byte()).contains(&byte) {
            Some(byte.wrapping_sub(Opcode::LOG0.to_byte()))
        } else {
            None
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode.to_byte()
    }
}
