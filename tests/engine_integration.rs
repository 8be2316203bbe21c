//! End-to-end tests through the compiled-expression API (`fumifier()`),
//! covering plain JSONata-style evaluation and FLASH resource assembly
//! against an in-memory navigator.

use fumifier::engine::{fumifier, EngineError, EngineOptions};
use fumifier::policy::PolicyConfig;
use fumifier::resolver::{BindingStrength, ElementDefinition, ElementKind, InMemoryStructureNavigator, TypeMeta};
use fumifier::value::{to_json, Value};
use std::sync::Arc;

/// F53xx "could not verify binding" codes sit in the warning band (severity
/// 31+) under the default thresholds, so a policy that wants them to run and
/// be fatal has to raise both `validation_level` and `throw_level` past it.
fn strict_binding_policy() -> PolicyConfig {
    PolicyConfig { validation_level: 40, throw_level: 40, ..PolicyConfig::default() }
}

fn patient_element(name: &str, kind: ElementKind, min: u32, type_code: &str) -> ElementDefinition {
    ElementDefinition {
        id: format!("Patient.{name}"),
        path: format!("Patient.{name}"),
        min,
        max: Some(1),
        base_path: format!("Patient.{name}"),
        base_max: Some(1),
        type_codes: vec![type_code.to_string()],
        slice_name: None,
        kind,
        fhir_type_code: type_code.to_string(),
        is_array: false,
        json_names: vec![name.to_string()],
        flash_path_ref_key: format!("Patient::{name}"),
        fixed_value: None,
        pattern_value: None,
        regex_str: None,
        max_length: None,
        binding_strength: None,
        value_set_ref_key: None,
        value_set_expansion_mode: None,
    }
}

fn patient_navigator() -> Arc<InMemoryStructureNavigator> {
    let nav = InMemoryStructureNavigator::new();
    nav.insert_type_meta(
        "Patient",
        TypeMeta {
            kind: ElementKind::Resource,
            canonical_url: "http://hl7.org/fhir/StructureDefinition/Patient".to_string(),
            derivation: "specialization".to_string(),
            package: "hl7.fhir.r4.core".to_string(),
            fhir_type_code: "Patient".to_string(),
        },
    );
    nav.insert_children(
        "Patient",
        vec![
            patient_element("active", ElementKind::PrimitiveType, 0, "boolean"),
            patient_element("gender", ElementKind::PrimitiveType, 1, "code"),
        ],
    );
    Arc::new(nav)
}

#[tokio::test]
async fn evaluates_a_plain_expression_without_a_navigator() {
    let compiled = fumifier("$sum([1, 2, 3]) * 2", EngineOptions::default()).await.unwrap();
    let result = compiled.evaluate(Value::Undefined, &[]).await.unwrap();
    assert_eq!(result, Value::Number(12.0));
}

#[tokio::test]
async fn assigned_bindings_are_visible_to_every_call() {
    let compiled = fumifier("$prefix & name", EngineOptions::default()).await.unwrap();
    compiled.assign("prefix", Value::String("Dr. ".to_string()));
    let input = serde_json::json!({"name": "Smith"});
    let result = compiled.evaluate(Value::from_json(&input), &[]).await.unwrap();
    assert_eq!(result, Value::String("Dr. Smith".to_string()));
}

#[tokio::test]
async fn flash_block_assembles_a_resource_with_a_resolved_navigator() {
    let options = EngineOptions { navigator: Some(patient_navigator()), ..Default::default() };
    let compiled = fumifier("InstanceOf: Patient\n* active = true\n* gender = 'female'\n", options)
        .await
        .unwrap();
    assert!(compiled.contains_flash());

    let result = compiled.evaluate(Value::Undefined, &[]).await.unwrap();
    let json = to_json(&result);
    assert_eq!(json["resourceType"], "Patient");
    assert_eq!(json["active"], true);
    assert_eq!(json["gender"], "female");
}

#[tokio::test]
async fn flash_missing_mandatory_element_is_fatal() {
    let options = EngineOptions { navigator: Some(patient_navigator()), ..Default::default() };
    let compiled = fumifier("InstanceOf: Patient\n* active = true\n", options).await.unwrap();
    let err = compiled.evaluate(Value::Undefined, &[]).await.unwrap_err();
    assert_eq!(err.diagnostic.code, "F5130");
}

#[tokio::test]
async fn flash_without_a_navigator_fails_to_compile() {
    let err = fumifier("InstanceOf: Patient\n* active = true\n", EngineOptions::default()).await;
    assert!(matches!(err, Err(EngineError::MissingNavigator)));
}

#[tokio::test]
async fn evaluate_verbose_reports_status_200_when_clean() {
    let compiled = fumifier("1 + 1", EngineOptions::default()).await.unwrap();
    let report = compiled.evaluate_verbose(Value::Undefined, &[]).await;
    assert!(report.ok);
    assert_eq!(report.status, 200);
    assert!(report.diagnostics.is_empty());
}

#[tokio::test]
async fn evaluate_verbose_reports_status_422_on_a_thrown_error() {
    let compiled = fumifier("$error('boom')", EngineOptions::default()).await.unwrap();
    let report = compiled.evaluate_verbose(Value::Undefined, &[]).await;
    assert!(!report.ok);
    assert_eq!(report.status, 422);
    assert_eq!(report.diagnostics.len(), 1);
}

#[tokio::test]
async fn ast_round_trips_through_recompilation() {
    let first = fumifier("1 + 2 * 3", EngineOptions::default()).await.unwrap();
    let ast = first.ast().clone();
    let second = fumifier(ast, EngineOptions::default()).await.unwrap();
    let result = second.evaluate(Value::Undefined, &[]).await.unwrap();
    assert_eq!(result, Value::Number(7.0));
}

#[tokio::test]
async fn flash_required_binding_without_an_expansion_is_fatal() {
    let nav = InMemoryStructureNavigator::new();
    nav.insert_type_meta(
        "Patient",
        TypeMeta {
            kind: ElementKind::Resource,
            canonical_url: "http://hl7.org/fhir/StructureDefinition/Patient".to_string(),
            derivation: "specialization".to_string(),
            package: "hl7.fhir.r4.core".to_string(),
            fhir_type_code: "Patient".to_string(),
        },
    );
    let mut gender = patient_element("gender", ElementKind::PrimitiveType, 0, "code");
    gender.binding_strength = Some(BindingStrength::Required);
    gender.value_set_ref_key = Some("gender-vs".to_string());
    nav.insert_children("Patient", vec![gender]);

    let options = EngineOptions {
        navigator: Some(Arc::new(nav)),
        recover: true,
        policy: strict_binding_policy(),
        ..Default::default()
    };
    let compiled = fumifier("InstanceOf: Patient\n* gender = 'not-a-real-code'\n", options).await.unwrap();
    let err = compiled.evaluate(Value::Undefined, &[]).await.unwrap_err();
    assert_eq!(err.diagnostic.code, "F5310");
}

#[tokio::test]
async fn flash_required_binding_rejects_a_code_outside_the_expansion() {
    let nav = InMemoryStructureNavigator::new();
    nav.insert_type_meta(
        "Patient",
        TypeMeta {
            kind: ElementKind::Resource,
            canonical_url: "http://hl7.org/fhir/StructureDefinition/Patient".to_string(),
            derivation: "specialization".to_string(),
            package: "hl7.fhir.r4.core".to_string(),
            fhir_type_code: "Patient".to_string(),
        },
    );
    let mut gender = patient_element("gender", ElementKind::PrimitiveType, 0, "code");
    gender.binding_strength = Some(BindingStrength::Required);
    gender.value_set_ref_key = Some("gender-vs".to_string());
    nav.insert_children("Patient", vec![gender]);
    let mut codes = std::collections::HashMap::new();
    codes.insert("male".to_string(), serde_json::json!({"display": "Male"}));
    codes.insert("female".to_string(), serde_json::json!({"display": "Female"}));
    nav.value_sets.write().unwrap().insert(
        "gender-vs".to_string(),
        [("http://hl7.org/fhir/administrative-gender".to_string(), codes)].into_iter().collect(),
    );

    let options = EngineOptions { navigator: Some(Arc::new(nav)), recover: true, ..Default::default() };
    let compiled = fumifier("InstanceOf: Patient\n* gender = 'not-a-real-code'\n", options).await.unwrap();
    let err = compiled.evaluate(Value::Undefined, &[]).await.unwrap_err();
    assert_eq!(err.diagnostic.code, "F5120");
}
