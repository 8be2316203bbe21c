//! Runtime value representation: sequences, tuple streams, FHIR
//! primitives, frames, function signatures, equality and coercion
//! (spec §3, §4.6).

pub mod equality;
pub mod frame;
pub mod function;
pub mod primitive;
pub mod sequence;
pub mod signature;

pub use equality::{deep_equal, to_boolean, to_display_string, to_number};
pub use frame::{Frame, GlobalState};
pub use function::{FunctionValue, NativeCallContext, NativeFn};
pub use primitive::FhirPrimitive;
pub use sequence::{Sequence, Tuple, TupleStream};
pub use signature::{parse_signature, validate_args, Param, ParamType, Signature};

use indexmap::IndexMap;
use std::sync::Arc;

/// A compiled regular-expression literal (spec §4.2 regex grammar).
#[derive(Debug, Clone)]
pub struct RegexValue {
    pub source: String,
    pub flags: String,
    pub regex: Arc<regex::Regex>,
    /// Set when the `g` flag was present: `$match`/`$replace` apply it
    /// to every occurrence rather than the first.
    pub global: bool,
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

/// A runtime value flowing through the evaluator.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value — JSONata's `undefined`, distinct from JSON
    /// `null`.
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// A literal array, as it would appear in input JSON. Does not
    /// auto-flatten, unlike [`Sequence`].
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// An evaluator-produced ordered container with singleton-collapse
    /// semantics (spec §3).
    Sequence(Sequence),
    FhirPrimitive(FhirPrimitive),
    Function(Arc<FunctionValue>),
    Regex(RegexValue),
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equality::deep_equal(self, other)
    }
}

impl Value {
    /// True unless this value is `Undefined`.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// Wrap a bare value in a single-slot sequence (spec §4.5 per-call
    /// setup: `$` bound to root input, wrapped if array).
    pub fn wrap_outer(self) -> Value {
        match &self {
            Value::Array(_) => Sequence::from_vec(vec![self]).with_keep_singleton(true).collapse(),
            _ => self,
        }
    }

    /// Convert a JSON value into a runtime [`Value`]. Arrays/objects are
    /// copied recursively.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => {
                Value::Object(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect())
            }
        }
    }
}

/// Convert a runtime [`Value`] back to JSON, flattening sequences and
/// FHIR primitives (spec §4.7 step 9, "Primitive flattening").
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Undefined => serde_json::Value::Null,
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::json!(n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => {
            serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect())
        }
        Value::Sequence(seq) => serde_json::Value::Array(seq.items().iter().map(to_json).collect()),
        Value::FhirPrimitive(p) => to_json(&p.value),
        Value::Function(f) => serde_json::Value::String(format!("<function:{}>", f.name())),
        Value::Regex(r) => serde_json::Value::String(format!("/{}/{}", r.source, r.flags)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_round_trips_scalars() {
        let v = Value::from_json(&serde_json::json!({"a": 1, "b": [true, null]}));
        assert_eq!(to_json(&v), serde_json::json!({"a": 1.0, "b": [true, null]}));
    }
}
