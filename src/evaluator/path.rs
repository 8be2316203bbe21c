//! Path stepping (spec §4.5 "path evaluation"): dotted navigation with
//! implicit array iteration, object member lookup, and `@`/`#` tuple
//! bindings threaded through per-item child frames.

use crate::ast::{BinaryOperator, ExpressionNode};
use crate::evaluator::error::EvalResult;
use crate::value::{Frame, Sequence, Value};
use futures::future::BoxFuture;

/// Navigate a named member off `input` (spec §4.5 "Name" node semantics):
/// object field lookup, mapped across array/sequence items, passing
/// through FHIR primitive wrappers to the underlying value.
pub fn get_member(input: &Value, name: &str) -> Value {
    match input {
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Undefined),
        Value::FhirPrimitive(p) => get_member(&p.value, name),
        Value::Array(items) => {
            let mut seq = Sequence::new();
            for item in items {
                seq.push(get_member(item, name));
            }
            seq.collapse()
        }
        Value::Sequence(items) => {
            let mut seq = Sequence::new();
            for item in items.items() {
                seq.push(get_member(item, name));
            }
            seq.collapse()
        }
        _ => Value::Undefined,
    }
}

/// `*` — all field values of an object (or mapped across an array).
pub fn wildcard(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            let mut seq = Sequence::new();
            for v in map.values() {
                seq.push(v.clone());
            }
            seq.collapse()
        }
        Value::Array(items) => {
            let mut seq = Sequence::new();
            for item in items {
                seq.push(wildcard(item));
            }
            seq.collapse()
        }
        Value::FhirPrimitive(p) => wildcard(&p.value),
        _ => Value::Undefined,
    }
}

/// `**` — recursive descendant collection: every object field value at
/// every depth, depth-first.
pub fn descendant(input: &Value) -> Value {
    let mut seq = Sequence::new();
    collect_descendants(input, &mut seq);
    seq.collapse()
}

fn collect_descendants(input: &Value, out: &mut Sequence) {
    match input {
        Value::Object(map) => {
            for v in map.values() {
                out.push(v.clone());
                collect_descendants(v, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_descendants(item, out);
            }
        }
        Value::FhirPrimitive(p) => collect_descendants(&p.value, out),
        _ => {}
    }
}

/// Flatten a step's result into the working item set: data arrays and
/// evaluator sequences both iterate implicitly (spec §4.5), unlike array
/// *constructors*, which stay intact.
pub fn flatten_for_step(value: Value) -> Vec<Value> {
    match value {
        Value::Undefined => Vec::new(),
        Value::Sequence(seq) => seq.into_items(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Evaluate a dotted path: each step narrows the working item set,
/// implicitly iterating arrays and binding `@`/`#` tuple variables into a
/// per-item child frame for steps further down the chain.
pub fn evaluate_path<'a>(
    steps: &'a [ExpressionNode],
    keep_singleton: bool,
    input: Value,
    base_frame: &'a Frame,
) -> BoxFuture<'a, EvalResult<Value>> {
    Box::pin(async move {
        let mut rows: Vec<(Value, Frame)> = vec![(input, base_frame.clone())];
        for step in steps {
            let mut next = Vec::new();
            for (index, (item, item_frame)) in rows.into_iter().enumerate() {
                step_into(step, item, &item_frame, index, &mut next).await?;
            }
            rows = next;
            if rows.is_empty() {
                break;
            }
        }
        let mut seq = Sequence::new().with_keep_singleton(keep_singleton);
        for (value, _) in rows {
            seq.push(value);
        }
        Ok(seq.collapse())
    })
}

async fn step_into(
    step: &ExpressionNode,
    item: Value,
    item_frame: &Frame,
    index: usize,
    out: &mut Vec<(Value, Frame)>,
) -> EvalResult<()> {
    match step {
        ExpressionNode::Binary { op: BinaryOperator::Focus, lhs, rhs, .. } => {
            let focus_target = item.clone();
            let produced = crate::evaluator::evaluate(lhs, item, item_frame).await?;
            for single in flatten_for_step(produced) {
                let child = item_frame.child();
                if let ExpressionNode::Variable { value, .. } = rhs.as_ref() {
                    child.bind(value.clone(), focus_target.clone());
                }
                out.push((single, child));
            }
        }
        ExpressionNode::Binary { op: BinaryOperator::Index, lhs, rhs, .. } => {
            let produced = crate::evaluator::evaluate(lhs, item, item_frame).await?;
            for single in flatten_for_step(produced) {
                let child = item_frame.child();
                if let ExpressionNode::Variable { value, .. } = rhs.as_ref() {
                    child.bind(value.clone(), Value::Number(index as f64));
                }
                out.push((single, child));
            }
        }
        _ => {
            let produced = crate::evaluator::evaluate(step, item, item_frame).await?;
            for single in flatten_for_step(produced) {
                out.push((single, item_frame.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_member_maps_across_arrays() {
        let input = Value::Array(vec![
            Value::from_json(&serde_json::json!({"given": "A"})),
            Value::from_json(&serde_json::json!({"given": "B"})),
        ]);
        let result = get_member(&input, "given");
        match result {
            Value::Sequence(seq) => assert_eq!(seq.len(), 2),
            other => panic!("expected sequence, got {other:?}"),
        }
    }
}
