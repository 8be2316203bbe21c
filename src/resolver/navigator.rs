//! The `StructureNavigator` contract (spec §6) and the two reference
//! implementations the crate ships as usable defaults (spec §3
//! "Supplemented features": the navigator itself stays an external
//! collaborator, out of core scope).

use super::types::{ElementDefinition, ExpandedValueSet, ExpansionCount, ExpansionCountStatus, TypeMeta};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// The external FHIR-definition provider consumed by the resolver.
/// Implementations are typically backed by a FHIR package manager; the
/// core crate only depends on this interface.
#[async_trait]
pub trait StructureNavigator: Send + Sync {
    /// Fetch a single element definition by its flash-path ref key.
    async fn get_element(&self, snapshot_id: &str, path: &str) -> Option<ElementDefinition>;

    /// Fetch direct children of a type or element.
    async fn get_children(&self, snapshot_id_or_meta: &str, path: Option<&str>) -> Vec<ElementDefinition>;

    /// Fetch type-level metadata for an `instanceof` target.
    async fn get_type_meta(&self, snapshot_id: &str) -> Option<TypeMeta>;

    /// Fetch metadata for a FHIR base primitive type (e.g. `string`).
    async fn get_base_type_meta(&self, type_code: &str, source_package: &str) -> Option<TypeMeta>;

    /// Fetch a full ValueSet expansion.
    async fn expand_value_set(&self, key: &str, source_package: Option<&str>) -> Option<ExpandedValueSet>;

    /// Probe expansion size without fetching the full set.
    async fn get_value_set_expansion_count(
        &self,
        key: &str,
        source_package: Option<&str>,
    ) -> ExpansionCount;

    /// Optional: direct membership test, bypassing local expansion.
    async fn in_value_set(
        &self,
        _code_or_coding: &serde_json::Value,
        _vs_key: &str,
        _source_package: Option<&str>,
    ) -> Option<bool> {
        None
    }

    /// Optional: ConceptMap translation.
    async fn translate_concept_map(
        &self,
        _code_or_coding: &serde_json::Value,
        _cm_key: &str,
        _source_package: Option<&str>,
    ) -> Option<serde_json::Value> {
        None
    }
}

/// A navigator that always reports "not found"; useful as a placeholder
/// when a compiled expression is known not to contain FLASH.
#[derive(Debug, Default)]
pub struct EmptyStructureNavigator;

#[async_trait]
impl StructureNavigator for EmptyStructureNavigator {
    async fn get_element(&self, _snapshot_id: &str, _path: &str) -> Option<ElementDefinition> {
        None
    }

    async fn get_children(&self, _snapshot_id_or_meta: &str, _path: Option<&str>) -> Vec<ElementDefinition> {
        Vec::new()
    }

    async fn get_type_meta(&self, _snapshot_id: &str) -> Option<TypeMeta> {
        None
    }

    async fn get_base_type_meta(&self, _type_code: &str, _source_package: &str) -> Option<TypeMeta> {
        None
    }

    async fn expand_value_set(&self, _key: &str, _source_package: Option<&str>) -> Option<ExpandedValueSet> {
        None
    }

    async fn get_value_set_expansion_count(
        &self,
        _key: &str,
        _source_package: Option<&str>,
    ) -> ExpansionCount {
        ExpansionCount { status: ExpansionCountStatus::NotFound, count: 0 }
    }
}

/// An in-memory navigator for tests and examples, backed by plain maps.
#[derive(Default)]
pub struct InMemoryStructureNavigator {
    pub type_meta: RwLock<HashMap<String, TypeMeta>>,
    pub children: RwLock<HashMap<String, Vec<ElementDefinition>>>,
    pub elements: RwLock<HashMap<String, ElementDefinition>>,
    pub value_sets: RwLock<HashMap<String, ExpandedValueSet>>,
}

impl InMemoryStructureNavigator {
    /// An empty navigator ready to be populated with `insert_*` helpers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_type_meta(&self, key: impl Into<String>, meta: TypeMeta) {
        self.type_meta.write().unwrap().insert(key.into(), meta);
    }

    pub fn insert_children(&self, key: impl Into<String>, children: Vec<ElementDefinition>) {
        self.children.write().unwrap().insert(key.into(), children);
    }

    pub fn insert_element(&self, key: impl Into<String>, element: ElementDefinition) {
        self.elements.write().unwrap().insert(key.into(), element);
    }
}

#[async_trait]
impl StructureNavigator for InMemoryStructureNavigator {
    async fn get_element(&self, _snapshot_id: &str, path: &str) -> Option<ElementDefinition> {
        self.elements.read().unwrap().get(path).cloned()
    }

    async fn get_children(&self, snapshot_id_or_meta: &str, path: Option<&str>) -> Vec<ElementDefinition> {
        let key = match path {
            Some(p) => format!("{snapshot_id_or_meta}::{p}"),
            None => snapshot_id_or_meta.to_string(),
        };
        self.children.read().unwrap().get(&key).cloned().unwrap_or_default()
    }

    async fn get_type_meta(&self, snapshot_id: &str) -> Option<TypeMeta> {
        self.type_meta.read().unwrap().get(snapshot_id).cloned()
    }

    async fn get_base_type_meta(&self, type_code: &str, _source_package: &str) -> Option<TypeMeta> {
        self.type_meta.read().unwrap().get(type_code).cloned()
    }

    async fn expand_value_set(&self, key: &str, _source_package: Option<&str>) -> Option<ExpandedValueSet> {
        self.value_sets.read().unwrap().get(key).cloned()
    }

    async fn get_value_set_expansion_count(
        &self,
        key: &str,
        _source_package: Option<&str>,
    ) -> ExpansionCount {
        match self.value_sets.read().unwrap().get(key) {
            Some(vs) => {
                let count = vs.values().map(|codes| codes.len() as u64).sum();
                ExpansionCount { status: ExpansionCountStatus::Ok, count }
            }
            None => ExpansionCount { status: ExpansionCountStatus::NotFound, count: 0 },
        }
    }
}
