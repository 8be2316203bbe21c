//! Regex-literal evaluation (spec §4.2): compiles once per node
//! evaluation into a first-class [`Value::Regex`].

use crate::diagnostics::{ErrorCode, Position};
use crate::evaluator::error::{EvalError, EvalResult};
use crate::value::{RegexValue, Value};
use std::sync::Arc;

/// Compile a `/pattern/flags` literal into a runtime regex value.
pub fn compile_regex_function(pattern: &str, flags: &str, position: Position) -> EvalResult<Value> {
    let mut builder = regex::RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            'g' => {}
            other => {
                return Err(EvalError::catalog(
                    ErrorCode::S0302,
                    position,
                    &[("char", other.to_string())],
                ));
            }
        }
    }
    let compiled = builder
        .build()
        .map_err(|e| EvalError::catalog(ErrorCode::S0302, position, &[("message", e.to_string())]))?;
    Ok(Value::Regex(RegexValue {
        source: pattern.to_string(),
        flags: flags.to_string(),
        regex: Arc::new(compiled),
        global: flags.contains('g'),
    }))
}
