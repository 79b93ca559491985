//! A readable way to assemble bytecode, used by the tests and the CLI
//! examples: one variant per instruction, `to_bytecode` renders the raw
//! bytes.
use crate::opcodes::Opcode;
use bytes::Bytes;
use ethereum_types::U256;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operation {
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    Sdiv,
    Mod,
    SMod,
    Addmod,
    Mulmod,
    Exp,
    SignExtend,
    Lt,
    Gt,
    Slt,
    Sgt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,
    Shl,
    Shr,
    Sar,
    Keccak256,
    Address,
    Balance,
    Origin,
    Caller,
    Callvalue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    Codesize,
    Codecopy,
    Gasprice,
    ExtcodeSize,
    ExtcodeCopy,
    ReturnDataSize,
    ReturnDataCopy,
    ExtcodeHash,
    BlockHash,
    Coinbase,
    Timestamp,
    Number,
    Prevrandao,
    Gaslimit,
    Chainid,
    SelfBalance,
    Basefee,
    BlobHash,
    BlobBaseFee,
    Pop,
    Mload,
    Mstore,
    Mstore8,
    Sload,
    Sstore,
    Jump,
    Jumpi,
    PC,
    Msize,
    Gas,
    Jumpdest,
    Tload,
    Tstore,
    Mcopy,
    Push0,
    /// `(n, value)`: PUSHn with the low `n` bytes of `value` as immediate.
    Push((u8, U256)),
    Dup(u8),
    Swap(u8),
    Log(u8),
    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Create2,
    StaticCall,
    Revert,
    Invalid,
    SelfDestruct,
}

impl Operation {
    pub fn to_bytecode(&self) -> Bytes {
        match self {
            Operation::Stop => single(Opcode::STOP),
            Operation::Add => single(Opcode::ADD),
            Operation::Mul => single(Opcode::MUL),
            Operation::Sub => single(Opcode::SUB),
            Operation::Div => single(Opcode::DIV),
            Operation::Sdiv => single(Opcode::SDIV),
            Operation::Mod => single(Opcode::MOD),
            Operation::SMod => single(Opcode::SMOD),
            Operation::Addmod => single(Opcode::ADDMOD),
            Operation::Mulmod => single(Opcode::MULMOD),
            Operation::Exp => single(Opcode::EXP),
            Operation::SignExtend => single(Opcode::SIGNEXTEND),
            Operation::Lt => single(Opcode::LT),
            Operation::Gt => single(Opcode::GT),
            Operation::Slt => single(Opcode::SLT),
            Operation::Sgt => single(Opcode::SGT),
            Operation::Eq => single(Opcode::EQ),
            Operation::IsZero => single(Opcode::ISZERO),
            Operation::And => single(Opcode::AND),
            Operation::Or => single(Opcode::OR),
            Operation::Xor => single(Opcode::XOR),
            Operation::Not => single(Opcode::NOT),
            Operation::Byte => single(Opcode::BYTE),
            Operation::Shl => single(Opcode::SHL),
            Operation::Shr => single(Opcode::SHR),
            Operation::Sar => single(Opcode::SAR),
            Operation::Keccak256 => single(Opcode::KECCAK256),
            Operation::Address => single(Opcode::ADDRESS),
            Operation::Balance => single(Opcode::BALANCE),
            Operation::Origin => single(Opcode::ORIGIN),
            Operation::Caller => single(Opcode::CALLER),
            Operation::Callvalue => single(Opcode::CALLVALUE),
            Operation::CallDataLoad => single(Opcode::CALLDATALOAD),
            Operation::CallDataSize => single(Opcode::CALLDATASIZE),
            Operation::CallDataCopy => single(Opcode::CALLDATACOPY),
            Operation::Codesize => single(Opcode::CODESIZE),
            Operation::Codecopy => single(Opcode::CODECOPY),
            Operation::Gasprice => single(Opcode::GASPRICE),
            Operation::ExtcodeSize => single(Opcode::EXTCODESIZE),
            Operation::ExtcodeCopy => single(Opcode::EXTCODECOPY),
            Operation::ReturnDataSize => single(Opcode::RETURNDATASIZE),
            Operation::ReturnDataCopy => single(Opcode::RETURNDATACOPY),
            Operation::ExtcodeHash => single(Opcode::EXTCODEHASH),
            Operation::BlockHash => single(Opcode::BLOCKHASH),
            Operation::Coinbase => single(Opcode::COINBASE),
            Operation::Timestamp => single(Opcode::TIMESTAMP),
            Operation::Number => single(Opcode::NUMBER),
            Operation::Prevrandao => single(Opcode::PREVRANDAO),
            Operation::Gaslimit => single(Opcode::GASLIMIT),
            Operation::Chainid => single(Opcode::CHAINID),
            Operation::SelfBalance => single(Opcode::SELFBALANCE),
            Operation::Basefee => single(Opcode::BASEFEE),
            Operation::BlobHash => single(Opcode::BLOBHASH),
            Operation::BlobBaseFee => single(Opcode::BLOBBASEFEE),
            Operation::Pop => single(Opcode::POP),
            Operation::Mload => single(Opcode::MLOAD),
            Operation::Mstore => single(Opcode::MSTORE),
            Operation::Mstore8 => single(Opcode::MSTORE8),
            Operation::Sload => single(Opcode::SLOAD),
            Operation::Sstore => single(Opcode::SSTORE),
            Operation::Jump => single(Opcode::JUMP),
            Operation::Jumpi => single(Opcode::JUMPI),
            Operation::PC => single(Opcode::PC),
            Operation::Msize => single(Opcode::MSIZE),
            Operation::Gas => single(Opcode::GAS),
            Operation::Jumpdest => single(Opcode::JUMPDEST),
            Operation::Tload => single(Opcode::TLOAD),
            Operation::Tstore => single(Opcode::TSTORE),
            Operation::Mcopy => single(Opcode::MCOPY),
            Operation::Push0 => single(Opcode::PUSH0),
            Operation::Push((n_bytes, value)) => push_bytecode(*n_bytes, *value),
            Operation::Dup(depth) => parametrized(Opcode::DUP1, *depth),
            Operation::Swap(depth) => parametrized(Opcode::SWAP1, *depth),
            Operation::Log(topics) => {
                let byte = Opcode::LOG0.to_byte().saturating_add((*topics).min(4));
                Bytes::copy_from_slice(&[byte])
            }
            Operation::Create => single(Opcode::CREATE),
            Operation::Call => single(Opcode::CALL),
            Operation::CallCode => single(Opcode::CALLCODE),
            Operation::Return => single(Opcode::RETURN),
            Operation::DelegateCall => single(Opcode::DELEGATECALL),
            Operation::Create2 => single(Opcode::CREATE2),
            Operation::StaticCall => single(Opcode::STATICCALL),
            Operation::Revert => single(Opcode::REVERT),
            Operation::Invalid => single(Opcode::INVALID),
            Operation::SelfDestruct => single(Opcode::SELFDESTRUCT),
        }
    }
}

fn single(opcode: Opcode) -> Bytes {
    Bytes::copy_from_slice(&[opcode.to_byte()])
}

/// DUPn / SWAPn, clamped to the 1..=16 the instruction set defines.
fn parametrized(base: Opcode, depth: u8) -> Bytes {
    let depth = depth.clamp(1, 16);
    let byte = base.to_byte().saturating_add(depth.saturating_sub(1));
    Bytes::copy_from_slice(&[byte])
}

fn push_bytecode(n_bytes: u8, value: U256) -> Bytes {
    let n_bytes = usize::from(n_bytes.clamp(1, 32));
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    let mut out = Vec::with_capacity(n_bytes.saturating_add(1));
    let opcode = Opcode::PUSH1
        .to_byte()
        .saturating_add(u8::try_from(n_bytes).unwrap_or(1).saturating_sub(1));
    out.push(opcode);
    out.extend_from_slice(word.get(32usize.saturating_sub(n_bytes)..).unwrap_or_default());
    Bytes::from(out)
}
