//! FHIR primitive wrapper (spec §3, §9 "prototype-based FHIR-primitive
//! marker").

use super::Value;
use indexmap::IndexMap;

/// A FHIR primitive value: the primitive's own `value`, plus optional
/// sibling properties (`id`, `extension`, ...). Recognized by being this
/// variant rather than by a marker key, per spec §9's redesign note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FhirPrimitive {
    pub value: Box<Value>,
    pub siblings: IndexMap<String, Value>,
}

impl FhirPrimitive {
    /// Build a bare primitive with no siblings.
    pub fn new(value: Value) -> Self {
        Self { value: Box::new(value), siblings: IndexMap::new() }
    }

    /// True if there are no sibling properties to flatten into `_key`.
    pub fn has_no_siblings(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Split this primitive into its two-key FHIR JSON form: the bare
    /// value, and (if any siblings exist) the `_key` sibling object.
    pub fn flatten(&self) -> (Value, Option<Value>) {
        if self.siblings.is_empty() {
            return ((*self.value).clone(), None);
        }
        let siblings = Value::Object(self.siblings.clone());
        ((*self.value).clone(), Some(siblings))
    }
}
