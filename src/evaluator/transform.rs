//! The `|pattern|update|delete|` transform operator (spec §4.2/§4.5):
//! evaluates to a one-argument function that deep-copies its input,
//! merging `update` into every sub-object matched by `pattern` and
//! stripping any keys named by `delete`.

use crate::ast::{ExpressionNode, Transform};
use crate::evaluator::error::EvalResult;
use crate::value::{Frame, FunctionValue, NativeCallContext, NativeFn, Value};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Build the transformer function value for a `Transform` node.
pub fn evaluate_transform(t: &Transform, frame: &Frame) -> EvalResult<Value> {
    let pattern = t.pattern.clone();
    let update = t.update.clone();
    let delete = t.delete.clone();
    let closure = frame.clone();
    let func: NativeFn = Arc::new(move |ctx: NativeCallContext, args: Vec<Value>| {
        let pattern = pattern.clone();
        let update = update.clone();
        let delete = delete.clone();
        let closure = closure.clone();
        Box::pin(async move {
            let target = args.into_iter().next().unwrap_or(ctx.input);
            apply_transform(&pattern, &update, delete.as_deref(), target, &closure).await
        })
    });
    Ok(Value::Function(Arc::new(FunctionValue::Native { name: "transform".to_string(), signature: None, func })))
}

fn apply_transform<'a>(
    pattern: &'a ExpressionNode,
    update: &'a ExpressionNode,
    delete: Option<&'a ExpressionNode>,
    node: Value,
    frame: &'a Frame,
) -> BoxFuture<'a, EvalResult<Value>> {
    Box::pin(async move {
        let mut node = node;
        let is_match = crate::evaluator::evaluate(pattern, node.clone(), frame).await?;
        if is_match.is_defined() {
            if let Value::Object(_) = &node {
                let update_value = crate::evaluator::evaluate(update, node.clone(), frame).await?;
                if let (Value::Object(map), Value::Object(update_map)) = (&mut node, update_value) {
                    for (k, v) in update_map {
                        map.insert(k, v);
                    }
                }
                if let Some(delete_expr) = delete {
                    let delete_value = crate::evaluator::evaluate(delete_expr, node.clone(), frame).await?;
                    if let Value::Object(map) = &mut node {
                        for key in delete_keys(delete_value) {
                            map.shift_remove(&key);
                        }
                    }
                }
            }
        }
        node = match node {
            Value::Object(map) => {
                let mut out = indexmap::IndexMap::new();
                for (k, v) in map {
                    out.insert(k, apply_transform(pattern, update, delete, v, frame).await?);
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(apply_transform(pattern, update, delete, item, frame).await?);
                }
                Value::Array(out)
            }
            other => other,
        };
        Ok(node)
    })
}

fn delete_keys(value: Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s],
        Value::Array(items) => items.into_iter().filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }).collect(),
        Value::Sequence(seq) => delete_keys(Value::Array(seq.into_items())),
        _ => Vec::new(),
    }
}
