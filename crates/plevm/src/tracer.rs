use crate::call_frame::CallFrame;
use crate::errors::VMError;

/// Per-step hook around the dispatch loop. The default bodies are empty, so
/// a stateless tracer monomorphizes to nothing and costs nothing.
pub trait Tracer {
    fn before_op(&mut self, _pc: usize, _frame: &CallFrame) {}

    fn after_op(&mut self, _pc: usize, _frame: &CallFrame) {}

    fn on_error(&mut self, _error: &VMError) {}
}

/// The zero-cost default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}
