//! Parser error type and friendly-recovery code mapping.

use crate::diagnostics::{Diagnostic, ErrorCode, Position};
use std::collections::HashMap;

/// A parse-time error, either propagated immediately (`recover=false`) or
/// collected into the compiled expression's `errors()` list
/// (`recover=true`).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub Diagnostic);

impl ParseError {
    pub(crate) fn new(code: ErrorCode, position: Position, inserts: &[(&str, String)]) -> Self {
        let map: HashMap<String, String> =
            inserts.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        ParseError(Diagnostic::new(code, position, "parse", 0, &map))
    }

    pub(crate) fn from_lex(err: crate::lexer::LexError) -> Self {
        ParseError(err.0)
    }
}

/// Result alias for parser internals.
pub type ParseResult<T> = Result<T, ParseError>;
