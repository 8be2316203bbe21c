//! Evaluation hook points (spec §4.5, §5 "cancellation/timeouts").
//!
//! Not built into the core: the evaluator calls these at every node
//! boundary and frame creation; external code (a sandbox, a wall-clock
//! or stack-depth timebox) may return `Err` to abort.

use crate::evaluator::error::EvalResult;

/// Hooks invoked around every node evaluation and frame creation.
/// Default implementations are no-ops.
pub trait EvaluationHooks: Send + Sync {
    /// Called before a node evaluates. Returning `Err` aborts evaluation.
    fn on_evaluate_entry(&self) -> EvalResult<()> {
        Ok(())
    }

    /// Called after a node evaluates.
    fn on_evaluate_exit(&self) -> EvalResult<()> {
        Ok(())
    }

    /// Called whenever a new [`crate::value::Frame`] is pushed.
    fn on_create_frame_push(&self) {}
}

/// A hook set that does nothing, the default when no caller installs one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHooks;

impl EvaluationHooks for NullHooks {}
