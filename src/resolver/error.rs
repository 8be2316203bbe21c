//! Resolver error type.

use crate::diagnostics::{Diagnostic, ErrorCode, Position};
use std::collections::HashMap;

/// A definition-resolution error. Fatal unless `recover=true`, in which
/// case it is collected and the referencing slot is marked `__isError`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .0.message)]
pub struct ResolverError(pub Diagnostic);

impl ResolverError {
    pub(crate) fn new(code: ErrorCode, position: Position, inserts: &[(&str, String)]) -> Self {
        let map: HashMap<String, String> =
            inserts.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        ResolverError(Diagnostic::new(code, position, "resolve", 0, &map))
    }
}
