//! Lexer error type.

use crate::diagnostics::{Diagnostic, ErrorCode, Position};
use std::collections::HashMap;

/// Errors the lexer can raise; all correspond to fatal `S0xxx` catalog
/// codes.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct LexError(pub Diagnostic);

impl LexError {
    pub(crate) fn new(code: ErrorCode, position: Position, inserts: &[(&str, String)]) -> Self {
        let map: HashMap<String, String> =
            inserts.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        LexError(Diagnostic::new(code, position, "lex", 0, &map))
    }
}
