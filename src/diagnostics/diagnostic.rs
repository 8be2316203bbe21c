//! The diagnostic entry record.

use super::catalog::{render_template, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A source position: byte offset plus line number and the offset of the
/// start of that line's containing construct (used for FLASH indentation
/// bookkeeping as well as plain error reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// Byte offset of the start of the token/construct (may equal `offset`).
    pub start: usize,
}

impl Position {
    /// A zero position, used when no real position is available.
    pub const ZERO: Position = Position { offset: 0, line: 1, start: 0 };
}

/// A single diagnostic entry placed in a per-call diagnostics bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The catalog code, e.g. `"F5120"`.
    pub code: String,
    /// Numeric severity (see [`ErrorCode::severity`]).
    pub severity: i32,
    /// Human-readable severity band name.
    pub level: String,
    /// Rendered message.
    pub message: String,
    /// Source position.
    pub position: Position,
    /// FHIR context: the parent element path, if this diagnostic concerns a
    /// FLASH/FHIR element.
    pub fhir_parent: Option<String>,
    /// FHIR context: the specific element path.
    pub fhir_element: Option<String>,
    /// Milliseconds since epoch when the diagnostic was created.
    pub timestamp: i64,
    /// The execution id of the evaluation call that produced this.
    pub execution_id: String,
    /// Set when a diagnostic was suppressed from logging/throwing by the
    /// policy engine but still collected.
    pub inhibited: bool,
}

impl Diagnostic {
    /// Build a diagnostic from a catalog code, position, execution id, and
    /// a set of template inserts. The message is rendered eagerly.
    pub fn new(
        code: ErrorCode,
        position: Position,
        execution_id: impl Into<String>,
        timestamp: i64,
        inserts: &HashMap<String, String>,
    ) -> Self {
        Self {
            code: code.as_str().to_string(),
            severity: code.severity(),
            level: code.level_name().to_string(),
            message: render_template(code.message_template(), inserts),
            position,
            fhir_parent: None,
            fhir_element: None,
            timestamp,
            execution_id: execution_id.into(),
            inhibited: false,
        }
    }

    /// Attach FHIR element context.
    pub fn with_fhir_context(
        mut self,
        parent: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        self.fhir_parent = Some(parent.into());
        self.fhir_element = Some(element.into());
        self
    }

    /// Key used for deduplication within a diagnostics bag bucket.
    pub fn dedupe_key(&self) -> (String, String, String, usize, usize, u32, String) {
        (
            self.code.clone(),
            self.fhir_parent.clone().unwrap_or_default(),
            self.fhir_element.clone().unwrap_or_default(),
            self.position.offset,
            self.position.start,
            self.position.line,
            self.message.clone(),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.code, self.level, self.message)
    }
}
