//! FLASH block/rule evaluation (spec §4.7): assembles `Instance:`/
//! `InstanceOf:` blocks and their `* path = value` rules into FHIR JSON,
//! checking mandatory elements, slices, primitive constraints, and
//! ValueSet bindings against the resolved-definitions bag along the way.

use crate::ast::{ExpressionNode, FlashBlock, FlashRule};
use crate::diagnostics::{ErrorCode, Position};
use crate::evaluator::error::{EvalError, EvalResult};
use crate::resolver::{BindingStrength, ElementDefinition, ElementKind, ExpandedValueSet, ExpansionMode};
use crate::value::{FhirPrimitive, Frame, Value};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Assemble an `Instance:`/`InstanceOf:` block into a FHIR JSON object.
pub async fn evaluate_flash_block(block: &FlashBlock, input: Value, frame: &Frame) -> EvalResult<Value> {
    let base_key = block.ref_key.clone().unwrap_or_else(|| block.instance_of.clone());
    let mut object = IndexMap::new();

    if matches!(resolved_kind(frame, Some(&base_key)), Some(ElementKind::Resource)) {
        object.insert("resourceType".to_string(), Value::String(block.instance_of.clone()));
    }
    if let Some(instance_expr) = &block.instance_expr {
        let id_value = crate::evaluator::evaluate(instance_expr, input.clone(), frame).await?;
        if id_value.is_defined() {
            object.insert("id".to_string(), id_value);
        }
    }

    let mut seen_slices: HashMap<String, HashSet<String>> = HashMap::new();
    assemble_into(&block.rules, input, frame, &mut object, &mut seen_slices).await?;
    check_mandatory(frame, &base_key, &mut object, &seen_slices, block.position).await?;
    inject_bundle_full_urls(&mut object);
    let object = order_children(frame, &base_key, object);
    let object = flatten_primitives(object);
    Ok(Value::Object(object))
}

/// Evaluate a single flash rule outside block assembly (reached only when
/// a rule is visited directly rather than folded into its parent block's
/// object; returns a one-key object for the rule's own segment).
pub async fn evaluate_flash_rule(rule: &FlashRule, input: Value, frame: &Frame) -> EvalResult<Value> {
    let mut object = IndexMap::new();
    let mut seen_slices = HashMap::new();
    assemble_one(rule, input, frame, &mut object, &mut seen_slices).await?;
    Ok(Value::Object(flatten_primitives(object)))
}

async fn assemble_into(
    rules: &[ExpressionNode],
    context: Value,
    frame: &Frame,
    out: &mut IndexMap<String, Value>,
    seen_slices: &mut HashMap<String, HashSet<String>>,
) -> EvalResult<()> {
    for rule_node in rules {
        if let ExpressionNode::FlashRule(rule) = rule_node {
            assemble_one(rule, context.clone(), frame, out, seen_slices).await?;
        }
    }
    Ok(())
}

async fn assemble_one(
    rule: &FlashRule,
    context: Value,
    frame: &Frame,
    out: &mut IndexMap<String, Value>,
    seen_slices: &mut HashMap<String, HashSet<String>>,
) -> EvalResult<()> {
    let rule_context = match &rule.context {
        Some(expr) => crate::evaluator::evaluate(expr, context.clone(), frame).await?,
        None => context,
    };
    let element = rule.ref_key.as_deref().and_then(|key| lookup_element(frame, key));
    let has_assignment = rule.inline_expression.is_some() || !rule.subrules.is_empty();

    if has_assignment {
        if let Some(el) = &element {
            if el.is_forbidden() {
                raise_policy(frame, ErrorCode::F5131, rule.position, &[("path", el.path.clone())])?;
                return Ok(());
            }
        }
    }

    if !rule.slices.is_empty() {
        seen_slices.entry(rule.name.clone()).or_default().insert(rule.slices.join("-"));
    }

    let json_key = resolve_json_key(rule, element.as_ref());
    let is_array = element.as_ref().map(|e| e.is_array).unwrap_or(!rule.slices.is_empty());
    let is_primitive = matches!(element.as_ref().map(|e| e.kind), Some(ElementKind::PrimitiveType));

    if is_primitive {
        let own_value = match &rule.inline_expression {
            Some(expr) => {
                let raw = crate::evaluator::evaluate(expr, rule_context.clone(), frame).await?;
                validate_primitive(frame, element.as_ref(), &raw, rule.position).await?;
                validate_binding(frame, element.as_ref(), &raw, rule.position).await?;
                Some(apply_fixed_or_pattern(element.as_ref(), raw))
            }
            None => match &element {
                Some(e) if e.fixed_value.is_some() || e.pattern_value.is_some() => {
                    Some(apply_fixed_or_pattern(Some(e), Value::Undefined))
                }
                _ => None,
            },
        };

        let mut siblings = IndexMap::new();
        if !rule.subrules.is_empty() {
            let mut nested_slices = HashMap::new();
            assemble_into(&rule.subrules, rule_context, frame, &mut siblings, &mut nested_slices).await?;
        }

        if own_value.is_none() && siblings.is_empty() {
            return Ok(());
        }

        if is_array {
            let item = Value::FhirPrimitive(FhirPrimitive {
                value: Box::new(own_value.unwrap_or(Value::Undefined)),
                siblings,
            });
            push_array(out, &json_key, item);
        } else {
            merge_primitive_into(out, &json_key, own_value, siblings);
        }
        return Ok(());
    }

    let value = if let Some(expr) = &rule.inline_expression {
        let raw = crate::evaluator::evaluate(expr, rule_context.clone(), frame).await?;
        validate_primitive(frame, element.as_ref(), &raw, rule.position).await?;
        validate_binding(frame, element.as_ref(), &raw, rule.position).await?;
        let raw = wrap_quantity_scalar(element.as_ref(), raw);
        apply_fixed_or_pattern(element.as_ref(), raw)
    } else if !rule.subrules.is_empty() {
        let mut nested = IndexMap::new();
        let mut nested_slices = HashMap::new();
        assemble_into(&rule.subrules, rule_context.clone(), frame, &mut nested, &mut nested_slices).await?;
        let ref_key = rule.ref_key.clone().unwrap_or_default();
        check_mandatory(frame, &ref_key, &mut nested, &nested_slices, rule.position).await?;
        apply_fixed_or_pattern(element.as_ref(), Value::Object(nested))
    } else if let Some(el) = &element {
        apply_fixed_or_pattern(Some(el), Value::Undefined)
    } else {
        Value::Undefined
    };

    if !value.is_defined() {
        return Ok(());
    }
    place_value(out, &json_key, value, is_array);
    Ok(())
}

/// Pick the JSON key a rule's value lands under: the first (and, once
/// `F2004` has been honored, only) polymorphic candidate the resolver
/// narrowed the element to, falling back to the rule's own written name.
fn resolve_json_key(rule: &FlashRule, element: Option<&ElementDefinition>) -> String {
    element.and_then(|e| e.json_names.first().cloned()).unwrap_or_else(|| rule.name.clone())
}

fn place_value(out: &mut IndexMap<String, Value>, key: &str, value: Value, is_array: bool) {
    if is_array {
        push_array(out, key, value);
    } else {
        out.insert(key.to_string(), value);
    }
}

fn push_array(out: &mut IndexMap<String, Value>, key: &str, value: Value) {
    match out.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let prior = existing.clone();
            out.insert(key.to_string(), Value::Array(vec![prior, value]));
        }
        None => {
            out.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}

/// Merge a scalar assignment and/or `id`/`extension` siblings for a
/// primitive element into whatever was previously assembled under `key`
/// (two separate rules, e.g. `* active = true` and `* active.id = "a1"`,
/// both contribute to the same primitive).
fn merge_primitive_into(
    out: &mut IndexMap<String, Value>,
    key: &str,
    own_value: Option<Value>,
    siblings: IndexMap<String, Value>,
) {
    let existing = out.get(key).cloned();
    let (mut value, mut merged_siblings) = match existing {
        Some(Value::FhirPrimitive(prev)) => ((*prev.value).clone(), prev.siblings),
        Some(prev) => (prev, IndexMap::new()),
        None => (Value::Undefined, IndexMap::new()),
    };
    if let Some(new_value) = own_value {
        value = new_value;
    }
    for (k, v) in siblings {
        merged_siblings.insert(k, v);
    }
    out.insert(key.to_string(), Value::FhirPrimitive(FhirPrimitive { value: Box::new(value), siblings: merged_siblings }));
}

/// Apply a `fixedX`/`patternX` binding to an assembled value: `fixed`
/// replaces it outright, `pattern` deep-merges under it.
fn apply_fixed_or_pattern(element: Option<&ElementDefinition>, raw: Value) -> Value {
    let Some(element) = element else { return raw };
    if let Some(fixed) = &element.fixed_value {
        return Value::from_json(fixed);
    }
    if let Some(pattern) = &element.pattern_value {
        return merge_pattern(Value::from_json(pattern), raw);
    }
    raw
}

fn merge_pattern(pattern: Value, raw: Value) -> Value {
    if !raw.is_defined() {
        return pattern;
    }
    match (pattern, raw) {
        (Value::Object(pattern_map), Value::Object(raw_map)) => {
            let mut merged = pattern_map;
            for (k, v) in raw_map {
                let combined = match merged.get(&k) {
                    Some(existing) => merge_pattern(existing.clone(), v),
                    None => v,
                };
                merged.insert(k, combined);
            }
            Value::Object(merged)
        }
        (_, raw) => raw,
    }
}

/// A bare number assigned to a `Quantity` element wraps to `{value: n}`.
fn wrap_quantity_scalar(element: Option<&ElementDefinition>, value: Value) -> Value {
    let Some(element) = element else { return value };
    if element.fhir_type_code != "Quantity" {
        return value;
    }
    match value {
        Value::Number(_) => {
            let mut map = IndexMap::new();
            map.insert("value".to_string(), value);
            Value::Object(map)
        }
        other => other,
    }
}

fn lookup_element(frame: &Frame, key: &str) -> Option<ElementDefinition> {
    frame.global.resolved.as_ref()?.element_definitions.get(key).map(|e| e.clone())
}

fn resolved_kind(frame: &Frame, ref_key: Option<&str>) -> Option<ElementKind> {
    let key = ref_key?;
    frame.global.resolved.as_ref()?.type_meta.get(key).map(|m| m.kind)
}

/// `element_children` is keyed by flash-path ref key for every nested
/// rule; a bare block-level `ref_key` (the `instanceof` itself) only
/// ever appears in `type_children`, so the two are checked in order.
fn children_of(resolved: &crate::resolver::ResolvedDefinitions, ref_key: &str) -> Option<Vec<ElementDefinition>> {
    resolved
        .element_children
        .get(ref_key)
        .map(|c| c.clone())
        .or_else(|| resolved.type_children.get(ref_key).map(|c| c.clone()))
}

async fn check_mandatory(
    frame: &Frame,
    ref_key: &str,
    object: &mut IndexMap<String, Value>,
    seen_slices: &HashMap<String, HashSet<String>>,
    position: Position,
) -> EvalResult<()> {
    let Some(resolved) = &frame.global.resolved else { return Ok(()) };
    let Some(children) = children_of(resolved, ref_key) else { return Ok(()) };
    for child in &children {
        if child.is_forbidden() || child.min < 1 {
            continue;
        }
        let json_key = child.json_names.first().cloned().unwrap_or_else(|| child.path.clone());
        if let Some(slice_name) = &child.slice_name {
            let satisfied = seen_slices.get(&json_key).map(|set| set.contains(slice_name)).unwrap_or(false);
            if satisfied {
                continue;
            }
            match build_virtual_slice(frame, child).await? {
                Some(value) => push_array(object, &json_key, value),
                None => {
                    raise_policy(
                        frame,
                        ErrorCode::F5140,
                        position,
                        &[("slice", slice_name.clone()), ("path", child.path.clone())],
                    )?;
                }
            }
            continue;
        }
        let present = child.json_names.iter().any(|n| object.contains_key(n));
        if !present {
            raise_policy(frame, ErrorCode::F5130, position, &[("path", child.path.clone())])?;
        }
    }
    Ok(())
}

/// Try to synthesize a value for a missing mandatory slice purely from
/// its own (and its mandatory children's) `fixed`/`pattern` bindings.
/// Returns `None` when no binding is strong enough to fabricate a value,
/// meaning the slice really is missing and `F5140` should fire.
fn build_virtual_slice<'a>(
    frame: &'a Frame,
    slice: &'a ElementDefinition,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = EvalResult<Option<Value>>> + Send + 'a>> {
    Box::pin(async move {
        if let Some(fixed) = &slice.fixed_value {
            return Ok(Some(Value::from_json(fixed)));
        }
        let Some(resolved) = &frame.global.resolved else {
            return Ok(slice.pattern_value.as_ref().map(Value::from_json));
        };
        let Some(children) = resolved.element_children.get(&slice.flash_path_ref_key).map(|c| c.clone()) else {
            return Ok(slice.pattern_value.as_ref().map(Value::from_json));
        };

        let mut object = IndexMap::new();
        if let Some(pattern) = &slice.pattern_value {
            if let Value::Object(map) = Value::from_json(pattern) {
                object = map;
            }
        }
        for child in &children {
            if child.is_forbidden() || child.min < 1 || object.contains_key(&child.path) {
                continue;
            }
            let json_key = child.json_names.first().cloned().unwrap_or_else(|| child.path.clone());
            if object.contains_key(&json_key) {
                continue;
            }
            match build_virtual_slice(frame, child).await? {
                Some(value) => {
                    object.insert(json_key, value);
                }
                None => return Ok(None),
            }
        }
        if object.is_empty() { Ok(None) } else { Ok(Some(Value::Object(object))) }
    })
}

/// Transaction/batch Bundles get a `fullUrl` stamped onto every entry
/// that doesn't already carry one.
fn inject_bundle_full_urls(object: &mut IndexMap<String, Value>) {
    if !matches!(object.get("resourceType"), Some(Value::String(s)) if s == "Bundle") {
        return;
    }
    let is_transaction =
        matches!(object.get("type"), Some(Value::String(s)) if s == "transaction" || s == "batch");
    if !is_transaction {
        return;
    }
    let Some(Value::Array(entries)) = object.get_mut("entry") else { return };
    for entry in entries.iter_mut() {
        let Value::Object(entry_map) = entry else { continue };
        if entry_map.contains_key("fullUrl") {
            continue;
        }
        let full_url = match entry_map.get("resource") {
            Some(Value::Object(resource)) => {
                let resource_type = resource.get("resourceType").and_then(as_plain_string);
                let id = resource.get("id").and_then(as_plain_string);
                match (resource_type, id) {
                    (Some(rt), Some(id)) => format!("{rt}/{id}"),
                    _ => format!("urn:uuid:{}", Uuid::new_v4()),
                }
            }
            _ => format!("urn:uuid:{}", Uuid::new_v4()),
        };
        entry_map.insert("fullUrl".to_string(), Value::String(full_url));
    }
}

/// Reorder the top-level keys of an assembled object to match the
/// resolved element-definition order (`resourceType`/`id` always first),
/// instead of the order rules happened to be evaluated in.
fn order_children(frame: &Frame, ref_key: &str, object: IndexMap<String, Value>) -> IndexMap<String, Value> {
    let Some(resolved) = &frame.global.resolved else { return object };
    let Some(children) = children_of(resolved, ref_key) else { return object };

    let mut ordered_keys = Vec::new();
    for child in &children {
        for name in &child.json_names {
            if !ordered_keys.contains(name) {
                ordered_keys.push(name.clone());
            }
        }
    }

    let mut out = IndexMap::new();
    if let Some(v) = object.get("resourceType") {
        out.insert("resourceType".to_string(), v.clone());
    }
    if let Some(v) = object.get("id") {
        out.insert("id".to_string(), v.clone());
    }
    for key in &ordered_keys {
        if key == "resourceType" || key == "id" {
            continue;
        }
        if let Some(v) = object.get(key) {
            out.insert(key.clone(), v.clone());
        }
    }
    for (key, value) in object {
        if !out.contains_key(&key) {
            out.insert(key, value);
        }
    }
    out
}

/// Split every [`FhirPrimitive`] left in the assembled tree into its
/// two-key FHIR JSON form (`key`/`_key`, or parallel arrays for a
/// primitive array with any siblings at all).
fn flatten_primitives(object: IndexMap<String, Value>) -> IndexMap<String, Value> {
    let mut out = IndexMap::new();
    for (key, value) in object {
        insert_flattened(&mut out, &key, value);
    }
    out
}

fn insert_flattened(out: &mut IndexMap<String, Value>, key: &str, value: Value) {
    match value {
        Value::FhirPrimitive(p) => {
            let (plain, siblings) = p.flatten();
            out.insert(key.to_string(), flatten_value(plain));
            if let Some(siblings) = siblings {
                out.insert(format!("_{key}"), flatten_value(siblings));
            }
        }
        Value::Array(items) => {
            let mut plain = Vec::with_capacity(items.len());
            let mut sibling_array = Vec::with_capacity(items.len());
            let mut any_sibling = false;
            for item in items {
                match item {
                    Value::FhirPrimitive(p) => {
                        let (v, s) = p.flatten();
                        plain.push(flatten_value(v));
                        match s {
                            Some(s) => {
                                any_sibling = true;
                                sibling_array.push(flatten_value(s));
                            }
                            None => sibling_array.push(Value::Null),
                        }
                    }
                    other => {
                        plain.push(flatten_value(other));
                        sibling_array.push(Value::Null);
                    }
                }
            }
            out.insert(key.to_string(), Value::Array(plain));
            if any_sibling {
                out.insert(format!("_{key}"), Value::Array(sibling_array));
            }
        }
        other => {
            out.insert(key.to_string(), flatten_value(other));
        }
    }
}

fn flatten_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(flatten_primitives(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(flatten_value).collect()),
        Value::FhirPrimitive(p) => flatten_value((*p.value).clone()),
        other => other,
    }
}

async fn validate_primitive(
    frame: &Frame,
    element: Option<&ElementDefinition>,
    value: &Value,
    position: Position,
) -> EvalResult<()> {
    let Some(element) = element else { return Ok(()) };
    if element.kind != ElementKind::PrimitiveType {
        return Ok(());
    }
    let Some(resolved) = &frame.global.resolved else { return Ok(()) };
    let Some(text) = primitive_text(value) else { return Ok(()) };

    if text.trim().is_empty() {
        raise_if_validated(frame, ErrorCode::F5112, position, &[])?;
    }
    if let Some(max_len) = element.max_length {
        if text.chars().count() as u32 > max_len {
            raise_if_validated(frame, ErrorCode::F5114, position, &[("maxLength", max_len.to_string())])?;
        }
    }
    if let Some(regex_str) = &element.regex_str {
        if let Some(re) = resolved.compiled_regex.get(regex_str) {
            if !re.is_match(&text) {
                raise_if_validated(
                    frame,
                    ErrorCode::F5110,
                    position,
                    &[("value", text.clone()), ("type", element.fhir_type_code.clone())],
                )?;
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingShape {
    Scalar,
    Coding,
    Quantity,
    CodeableConcept,
}

fn classify_shape(element: &ElementDefinition) -> BindingShape {
    match element.fhir_type_code.as_str() {
        "Coding" => BindingShape::Coding,
        "Quantity" | "SimpleQuantity" | "Age" | "Distance" | "Duration" | "Count" | "MoneyQuantity" => {
            BindingShape::Quantity
        }
        "CodeableConcept" => BindingShape::CodeableConcept,
        _ => BindingShape::Scalar,
    }
}

fn missing_expansion_code(element: &ElementDefinition, strength: BindingStrength) -> ErrorCode {
    let lazy = matches!(element.value_set_expansion_mode, Some(ExpansionMode::Lazy));
    match (strength, lazy) {
        (BindingStrength::Required, false) => ErrorCode::F5310,
        (BindingStrength::Required, true) => ErrorCode::F5311,
        (BindingStrength::Extensible, false) => ErrorCode::F5330,
        (BindingStrength::Extensible, true) => ErrorCode::F5331,
    }
}

fn not_found_code(strength: BindingStrength, shape: BindingShape) -> ErrorCode {
    match (strength, shape) {
        (BindingStrength::Required, BindingShape::Scalar) => ErrorCode::F5120,
        (BindingStrength::Required, BindingShape::Coding) => ErrorCode::F5121,
        (BindingStrength::Required, BindingShape::Quantity) => ErrorCode::F5122,
        (BindingStrength::Required, BindingShape::CodeableConcept) => ErrorCode::F5123,
        (BindingStrength::Extensible, BindingShape::Scalar) => ErrorCode::F5340,
        (BindingStrength::Extensible, BindingShape::Coding) => ErrorCode::F5341,
        (BindingStrength::Extensible, BindingShape::Quantity) => ErrorCode::F5342,
        (BindingStrength::Extensible, BindingShape::CodeableConcept) => ErrorCode::F5343,
    }
}

async fn validate_binding(
    frame: &Frame,
    element: Option<&ElementDefinition>,
    value: &Value,
    position: Position,
) -> EvalResult<()> {
    let Some(element) = element else { return Ok(()) };
    let Some(strength) = element.binding_strength else { return Ok(()) };
    let Some(vs_key) = &element.value_set_ref_key else { return Ok(()) };

    let missing_code = missing_expansion_code(element, strength);
    let Some(resolved) = &frame.global.resolved else { return Ok(()) };
    let Some(expansion) = resolved.value_set_expansions.get(vs_key) else {
        return raise_if_validated(frame, missing_code, position, &[("path", element.path.clone())]);
    };

    let shape = classify_shape(element);
    let found = match shape {
        BindingShape::Scalar => primitive_text(value).map(|code| expansion_contains(&expansion, None, &code)),
        BindingShape::Coding | BindingShape::Quantity => {
            coding_pair(value).map(|(system, code)| expansion_contains(&expansion, system.as_deref(), &code))
        }
        BindingShape::CodeableConcept => {
            let codings = codeable_concept_codings(value);
            if codings.is_empty() {
                None
            } else {
                Some(codings.iter().any(|(system, code)| expansion_contains(&expansion, system.as_deref(), code)))
            }
        }
    };

    if found == Some(false) {
        raise_if_validated(frame, not_found_code(strength, shape), position, &[("valueSet", vs_key.clone())])?;
    }
    Ok(())
}

fn expansion_contains(expansion: &ExpandedValueSet, system: Option<&str>, code: &str) -> bool {
    match system {
        Some(system) => expansion.get(system).map(|codes| codes.contains_key(code)).unwrap_or(false),
        None => expansion.values().any(|codes| codes.contains_key(code)),
    }
}

fn coding_pair(value: &Value) -> Option<(Option<String>, String)> {
    let Value::Object(map) = value else { return None };
    let code = map.get("code").and_then(as_plain_string)?;
    let system = map.get("system").and_then(as_plain_string);
    Some((system, code))
}

fn codeable_concept_codings(value: &Value) -> Vec<(Option<String>, String)> {
    let Value::Object(map) = value else { return Vec::new() };
    let Some(Value::Array(codings)) = map.get("coding") else { return Vec::new() };
    codings.iter().filter_map(coding_pair).collect()
}

fn primitive_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::FhirPrimitive(p) => match p.value.as_ref() {
            Value::String(s) => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn as_plain_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::FhirPrimitive(p) => as_plain_string(&p.value),
        _ => None,
    }
}

fn raise_policy(frame: &Frame, code: ErrorCode, position: Position, inserts: &[(&str, String)]) -> EvalResult<()> {
    let map: HashMap<String, String> = inserts.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    let mut bag = frame.global.diagnostics.lock().unwrap();
    let (diag, should_throw) = frame.global.policy.raise(
        code,
        position,
        &frame.global.execution_id,
        frame.global.timestamp_millis,
        &map,
        &mut bag,
        &frame.global.logger,
    );
    drop(bag);
    if should_throw {
        Err(EvalError::from_diagnostic(diag))
    } else {
        Ok(())
    }
}

/// `raise_policy`, but honoring `shouldValidate(code)` first (spec §4.8):
/// when the code's severity sits at or above the validation threshold,
/// the check is skipped entirely rather than merely not thrown.
fn raise_if_validated(frame: &Frame, code: ErrorCode, position: Position, inserts: &[(&str, String)]) -> EvalResult<()> {
    if !frame.global.policy.should_validate(code) {
        return Ok(());
    }
    raise_policy(frame, code, position, inserts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::policy::PolicyConfig;
    use crate::resolver::EmptyStructureNavigator;
    use crate::value::GlobalState;
    use std::sync::{Arc, Mutex};

    fn root_frame() -> Frame {
        let global = Arc::new(GlobalState {
            execution_id: "test".to_string(),
            timestamp_millis: 0,
            diagnostics: Mutex::new(crate::diagnostics::DiagnosticsBag::new()),
            logger: crate::diagnostics::default_logger(),
            policy: PolicyConfig::default(),
            resolved: None,
            hooks: None,
        });
        Frame::root(global)
    }

    #[tokio::test]
    async fn assembles_simple_instance_into_an_object() {
        let (ast, _errs) = parse("InstanceOf: Patient\n* active = true\n", false).unwrap();
        let (ast, _refs) = crate::rewriter::rewrite(ast);
        let frame = root_frame();
        let ExpressionNode::FlashBlock(block) = &ast else { panic!("expected flash block") };
        let result = evaluate_flash_block(block, Value::Undefined, &frame).await.unwrap();
        let Value::Object(map) = result else { panic!("expected object") };
        assert_eq!(map.get("active"), Some(&Value::Bool(true)));
    }

    #[allow(dead_code)]
    fn unused_navigator() -> EmptyStructureNavigator {
        EmptyStructureNavigator
    }
}
