pub mod call_frame;
pub mod code;
pub mod constants;
pub mod db;
pub mod environment;
pub mod errors;
pub mod ffi;
pub mod gas_cost;
pub mod memory;
pub mod opcode_handlers;
pub mod opcodes;
pub mod operations;
pub mod plan;
pub mod planner;
pub mod stack;
pub mod tracer;
pub mod utils;
pub mod vm;

pub use call_frame::CallFrame;
pub use code::Bytecode;
pub use db::{Database, InMemoryDb};
pub use environment::Environment;
pub use errors::{ExecutionReport, ExecutionResult, ResultReason, VMError};
pub use plan::Plan;
pub use planner::{Planner, PlannerConfig};
pub use tracer::{NoopTracer, Tracer};
pub use vm::VM;

pub mod primitives {
    pub use bytes::Bytes;
    pub use ethereum_types::{Address, H256, U256, U512};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
