//! Definition resolver: walks FLASH refs, fetches type/element metadata,
//! binds fixed/pattern values, expands ValueSets (spec §4.4).

pub mod error;
pub mod navigator;
pub mod types;

pub use error::ResolverError;
pub use navigator::{EmptyStructureNavigator, InMemoryStructureNavigator, StructureNavigator};
pub use types::*;

use crate::diagnostics::{Diagnostic, ErrorCode, Position};
use crate::rewriter::CollectedRefs;
use dashmap::DashMap;
use regex::Regex;

/// Keyed caches populated by resolution (spec §3 "Resolved-definitions bag").
#[derive(Default)]
pub struct ResolvedDefinitions {
    pub type_meta: DashMap<String, TypeMeta>,
    pub type_children: DashMap<String, Vec<ElementDefinition>>,
    pub element_definitions: DashMap<String, ElementDefinition>,
    pub element_children: DashMap<String, Vec<ElementDefinition>>,
    pub base_type_meta: DashMap<String, TypeMeta>,
    pub value_set_expansions: DashMap<String, ExpandedValueSet>,
    pub compiled_regex: DashMap<String, Regex>,
}

impl ResolvedDefinitions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// How many codes a bound ValueSet may have before the resolver falls
/// back to `lazy` mode rather than fetching a full expansion. The spec
/// calls this implementation-defined.
const EXPANSION_THRESHOLD: u64 = 100;

/// Run the 5-pass resolution algorithm over `refs`, using `navigator` to
/// fetch definitions. `recover` controls whether the first failure is
/// fatal or collected alongside a partial result.
pub async fn resolve(
    refs: &CollectedRefs,
    navigator: &dyn StructureNavigator,
    recover: bool,
) -> Result<(ResolvedDefinitions, Vec<Diagnostic>), Vec<Diagnostic>> {
    let defs = ResolvedDefinitions::new();
    let mut errors = Vec::new();

    // Pass 1: type metadata for each unique `instanceof`.
    for (instanceof, position) in dedup(&refs.structure_definition_refs) {
        match navigator.get_type_meta(&instanceof).await {
            Some(meta) => {
                defs.type_meta.insert(instanceof.clone(), meta);
            }
            None => {
                let diag = Diagnostic::new(
                    ErrorCode::F2007,
                    position,
                    "resolve",
                    0,
                    &[("path".to_string(), instanceof.clone())].into_iter().collect(),
                );
                if !recover {
                    return Err(vec![diag]);
                }
                errors.push(diag);
            }
        }
    }

    // Pass 2: children of each instanceof.
    for (instanceof, _) in dedup(&refs.structure_definition_refs) {
        let children = navigator.get_children(&instanceof, None).await;
        let children = children.into_iter().map(repair_content_reference).collect::<Vec<_>>();
        for child in &children {
            defs.element_definitions.insert(child.flash_path_ref_key.clone(), child.clone());
        }
        defs.type_children.insert(instanceof, children);
    }

    // Pass 3: exact element for each flashpath ref key.
    for (ref_key, position) in dedup(&refs.element_definition_refs) {
        if defs.element_definitions.contains_key(&ref_key) {
            continue;
        }
        let snapshot_id = ref_key.split("::").next().unwrap_or(&ref_key);
        match navigator.get_element(snapshot_id, &ref_key).await {
            Some(el) => {
                let el = repair_content_reference(el);
                if el.json_names.len() > 1 {
                    let diag = Diagnostic::new(
                        ErrorCode::F2004,
                        position,
                        "resolve",
                        0,
                        &[
                            ("path".to_string(), ref_key.clone()),
                            ("candidates".to_string(), el.json_names.join(", ")),
                        ]
                        .into_iter()
                        .collect(),
                    );
                    if !recover {
                        return Err(vec![diag]);
                    }
                    errors.push(diag);
                }
                let children = navigator.get_children(snapshot_id, Some(&ref_key)).await;
                for child in &children {
                    defs.element_definitions.insert(child.flash_path_ref_key.clone(), child.clone());
                }
                defs.element_children.insert(ref_key.clone(), children);
                defs.element_definitions.insert(ref_key, el);
            }
            None => {
                let diag = Diagnostic::new(
                    ErrorCode::F2002,
                    position,
                    "resolve",
                    0,
                    &[("path".to_string(), ref_key.clone()), ("type".to_string(), snapshot_id.to_string())]
                        .into_iter()
                        .collect(),
                );
                if !recover {
                    return Err(vec![diag]);
                }
                errors.push(diag);
            }
        }
    }

    // Pass 4: primitive-type regex/maxLength, compiled once per type code.
    let primitive_keys: Vec<String> = defs
        .element_definitions
        .iter()
        .filter(|e| e.kind == ElementKind::PrimitiveType)
        .map(|e| e.fhir_type_code.clone())
        .collect();
    for type_code in dedup_strings(primitive_keys) {
        if defs.base_type_meta.contains_key(&type_code) {
            continue;
        }
        if let Some(meta) = navigator.get_base_type_meta(&type_code, "").await {
            defs.base_type_meta.insert(type_code.clone(), meta);
        }
    }
    for mut entry in defs.element_definitions.iter_mut() {
        if let Some(regex_str) = entry.regex_str.clone() {
            if !defs.compiled_regex.contains_key(&regex_str) {
                let anchored = format!("^(?:{regex_str})$");
                if let Ok(re) = Regex::new(&anchored) {
                    defs.compiled_regex.insert(regex_str, re);
                }
            }
        }
    }

    // Pass 5: mandatory subtree walk — any unresolved element with
    // min>=1 and a non-system kind gets its children fetched too. Since
    // pass 2/3 already eagerly fetch children for every touched element,
    // this converges as soon as no new mandatory element is discovered.
    let mut frontier: Vec<String> = defs
        .element_definitions
        .iter()
        .filter(|e| e.min >= 1 && e.kind != ElementKind::System)
        .map(|e| e.flash_path_ref_key.clone())
        .collect();
    while let Some(ref_key) = frontier.pop() {
        if defs.element_children.contains_key(&ref_key) {
            continue;
        }
        let snapshot_id = ref_key.split("::").next().unwrap_or(&ref_key).to_string();
        let children = navigator.get_children(&snapshot_id, Some(&ref_key)).await;
        for child in &children {
            if !defs.element_definitions.contains_key(&child.flash_path_ref_key) {
                defs.element_definitions.insert(child.flash_path_ref_key.clone(), child.clone());
                if child.min >= 1 && child.kind != ElementKind::System {
                    frontier.push(child.flash_path_ref_key.clone());
                }
            }
        }
        defs.element_children.insert(ref_key, children);
    }

    // ValueSet binding resolution and expansion-count probing.
    let binding_keys: Vec<(String, String)> = defs
        .element_definitions
        .iter()
        .filter_map(|e| e.value_set_ref_key.clone().map(|vs| (e.flash_path_ref_key.clone(), vs)))
        .collect();
    for (_, vs_key) in binding_keys {
        if defs.value_set_expansions.contains_key(&vs_key) {
            continue;
        }
        let probe = navigator.get_value_set_expansion_count(&vs_key, None).await;
        match probe.status {
            ExpansionCountStatus::Ok if probe.count <= EXPANSION_THRESHOLD => {
                if let Some(expansion) = navigator.expand_value_set(&vs_key, None).await {
                    defs.value_set_expansions.insert(vs_key, expansion);
                }
            }
            _ => {
                // lazy/error modes are recorded on the element itself by
                // the caller; the bag simply has no expansion cached.
            }
        }
    }

    Ok((defs, errors))
}

fn dedup(items: &[(String, Position)]) -> Vec<(String, Position)> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (key, pos) in items {
        if seen.insert(key.clone()) {
            out.push((key.clone(), *pos));
        }
    }
    out
}

fn dedup_strings(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

/// Repair a child whose type is missing but which carries a content
/// reference: treat it as a `BackboneElement` (spec §4.4 pass 2).
fn repair_content_reference(mut el: ElementDefinition) -> ElementDefinition {
    if el.type_codes.is_empty() {
        el.type_codes.push("BackboneElement".to_string());
        el.fhir_type_code = "BackboneElement".to_string();
        el.kind = ElementKind::ComplexType;
    }
    el
}

/// Binding resolution precedence for one element (spec §4.4): required
/// strength with a non-empty ValueSet wins, then the
/// `elementdefinition-maxValueSet` extension, then extensible/preferred/
/// example in that order.
pub fn resolve_binding_strength(
    declared_strength: Option<&str>,
    has_value_set: bool,
    has_max_value_set_extension: bool,
) -> Option<BindingStrength> {
    if declared_strength == Some("required") && has_value_set {
        return Some(BindingStrength::Required);
    }
    if has_max_value_set_extension {
        return Some(BindingStrength::Required);
    }
    if matches!(declared_strength, Some("extensible") | Some("preferred") | Some("example")) && has_value_set
    {
        return Some(BindingStrength::Extensible);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_precedence_prefers_required_over_extensible() {
        let strength = resolve_binding_strength(Some("required"), true, false);
        assert_eq!(strength, Some(BindingStrength::Required));
    }

    #[test]
    fn max_value_set_extension_forces_required() {
        let strength = resolve_binding_strength(Some("extensible"), true, true);
        assert_eq!(strength, Some(BindingStrength::Required));
    }

    #[tokio::test]
    async fn resolve_reports_missing_type_when_not_recovering() {
        let nav = EmptyStructureNavigator;
        let mut refs = CollectedRefs::default();
        refs.structure_definition_refs.push(("Patient".to_string(), Position::ZERO));
        let result = resolve(&refs, &nav, false).await;
        assert!(result.is_err());
    }
}
