//! Evaluator error type.

use crate::diagnostics::{Diagnostic, ErrorCode, Position};
use std::collections::HashMap;

/// An evaluation-time error. Fatal catalog errors (outside `F5xyy`)
/// always become this; `F5xyy` errors only become this when the policy
/// engine decides `shouldThrow`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .diagnostic.message)]
pub struct EvalError {
    pub diagnostic: Diagnostic,
}

impl EvalError {
    /// Build an error from a catalog code and template inserts.
    pub fn catalog(code: ErrorCode, position: Position, inserts: &[(&str, String)]) -> Self {
        let map: HashMap<String, String> =
            inserts.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Self { diagnostic: Diagnostic::new(code, position, "eval", 0, &map) }
    }

    /// Wrap an already-built diagnostic (e.g. one routed through the
    /// policy engine).
    pub fn from_diagnostic(diagnostic: Diagnostic) -> Self {
        Self { diagnostic }
    }
}

/// Result alias for evaluator internals.
pub type EvalResult<T> = Result<T, EvalError>;
