//! Resolved FHIR definition types (spec §3 "Element definition (resolved)").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structural kind of an element or type, derived during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    System,
    PrimitiveType,
    ComplexType,
    Resource,
}

/// How far a bound ValueSet's expansion was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpansionMode {
    /// The full code set was fetched and is available for membership checks.
    Full,
    /// Too large to expand fully; membership cannot be checked locally.
    Lazy,
    /// Expansion was attempted and failed.
    Error,
}

/// Binding strength precedence outcome for an element (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingStrength {
    Required,
    Extensible,
}

/// Type-level metadata fetched via `getTypeMeta`/`getBaseTypeMeta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMeta {
    pub kind: ElementKind,
    pub canonical_url: String,
    /// `constraint` for a profile derived from a base type, `specialization`
    /// otherwise.
    pub derivation: String,
    pub package: String,
    pub fhir_type_code: String,
}

/// A resolved element definition (spec's `__`-prefixed derived fields are
/// plain struct fields here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub id: String,
    pub path: String,
    pub min: u32,
    /// `None` means unbounded (`*`).
    pub max: Option<u32>,
    pub base_path: String,
    pub base_max: Option<u32>,
    pub type_codes: Vec<String>,
    pub slice_name: Option<String>,

    pub kind: ElementKind,
    pub fhir_type_code: String,
    pub is_array: bool,
    /// JSON element names, including polymorphic `value[x]` candidates.
    pub json_names: Vec<String>,
    pub flash_path_ref_key: String,
    pub fixed_value: Option<serde_json::Value>,
    pub pattern_value: Option<serde_json::Value>,
    pub regex_str: Option<String>,
    pub max_length: Option<u32>,
    pub binding_strength: Option<BindingStrength>,
    pub value_set_ref_key: Option<String>,
    pub value_set_expansion_mode: Option<ExpansionMode>,
}

impl ElementDefinition {
    /// True if this element is forbidden (`max = 0`).
    pub fn is_forbidden(&self) -> bool {
        self.max == Some(0)
    }
}

/// An expanded ValueSet, keyed by system then code.
pub type ExpandedValueSet = HashMap<String, HashMap<String, serde_json::Value>>;

/// `{status, count}` returned by `getValueSetExpansionCount`.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionCount {
    pub status: ExpansionCountStatus,
    pub count: u64,
}

/// Outcome of a ValueSet expansion-count probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionCountStatus {
    Ok,
    NotFound,
    Error,
}
