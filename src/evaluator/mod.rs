//! Tree-walking evaluator (spec §4.5): per-node semantics over the
//! rewritten AST, hook points for external cancellation/timeboxing, and
//! the trampoline that unwinds tail-call thunks without growing the
//! native call stack.

mod call;
mod operators;
mod path;
mod regex;
mod transform;

pub mod error;
pub mod hooks;

pub use call::invoke;
pub use error::{EvalError, EvalResult};
pub use hooks::{EvaluationHooks, NullHooks};

use crate::ast::ExpressionNode;
use crate::diagnostics::ErrorCode;
use crate::value::{signature::parse_signature, Frame, FunctionValue, Value};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::sync::Arc;

/// Evaluate `node` against `input` inside `frame`, honoring any installed
/// [`EvaluationHooks`] around the node boundary (spec §4.5/§5).
pub fn evaluate<'a>(node: &'a ExpressionNode, input: Value, frame: &'a Frame) -> BoxFuture<'a, EvalResult<Value>> {
    Box::pin(async move {
        if let Some(hooks) = &frame.global.hooks {
            hooks.on_evaluate_entry()?;
        }
        let result = evaluate_inner(node, input, frame).await;
        if let Some(hooks) = &frame.global.hooks {
            hooks.on_evaluate_exit()?;
        }
        result
    })
}

async fn evaluate_inner(node: &ExpressionNode, input: Value, frame: &Frame) -> EvalResult<Value> {
    match node {
        ExpressionNode::Literal { value, .. } => Ok(Value::from_json(value)),
        ExpressionNode::Name { value, .. } => Ok(path::get_member(&input, value)),
        ExpressionNode::Variable { value, .. } => {
            if value.is_empty() {
                Ok(input)
            } else {
                Ok(frame.lookup(value).unwrap_or(Value::Undefined))
            }
        }
        ExpressionNode::Wildcard { .. } => Ok(path::wildcard(&input)),
        ExpressionNode::Descendant { .. } => Ok(path::descendant(&input)),
        ExpressionNode::Parent { slot, position } => match slot {
            Some(s) => Ok(frame.lookup(&s.label).unwrap_or(Value::Undefined)),
            None => Err(EvalError::catalog(ErrorCode::F3001, *position, &[("path", "%".to_string())])),
        },
        ExpressionNode::Regex { pattern, flags, position } => regex::compile_regex_function(pattern, flags, *position),
        ExpressionNode::Unary { op, expr, position } => {
            let value = evaluate(expr, input, frame).await?;
            operators::evaluate_unary(*op, value, *position)
        }
        ExpressionNode::ArrayConstructor { items, .. } => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match evaluate(item, input.clone(), frame).await? {
                    Value::Undefined => {}
                    Value::Sequence(seq) => out.extend(seq.into_items()),
                    other => out.push(other),
                }
            }
            Ok(Value::Array(out))
        }
        ExpressionNode::ObjectConstructor { pairs, position } => {
            let mut out = IndexMap::new();
            for (key_node, value_node) in pairs {
                let key_value = evaluate(key_node, input.clone(), frame).await?;
                let key = match crate::value::to_display_string(&key_value) {
                    Value::String(s) => s,
                    _ => continue,
                };
                let value = evaluate(value_node, input.clone(), frame).await?;
                if out.contains_key(&key) {
                    return Err(EvalError::catalog(ErrorCode::D1009, *position, &[("key", key)]));
                }
                out.insert(key, value);
            }
            Ok(Value::Object(out))
        }
        ExpressionNode::Binary { op, lhs, rhs, position } => {
            operators::evaluate_binary(*op, lhs, rhs, input, frame, *position).await
        }
        ExpressionNode::Condition { condition, then_expr, else_expr, .. } => {
            let test = evaluate(condition, input.clone(), frame).await?;
            if crate::value::to_boolean(&test) {
                evaluate(then_expr, input, frame).await
            } else if let Some(else_expr) = else_expr {
                evaluate(else_expr, input, frame).await
            } else {
                Ok(Value::Undefined)
            }
        }
        ExpressionNode::Coalesce { lhs, rhs, .. } => {
            let l = evaluate(lhs, input.clone(), frame).await?;
            if l.is_defined() {
                Ok(l)
            } else {
                evaluate(rhs, input, frame).await
            }
        }
        ExpressionNode::Elvis { lhs, rhs, .. } => {
            let l = evaluate(lhs, input.clone(), frame).await?;
            if crate::value::to_boolean(&l) {
                Ok(l)
            } else {
                evaluate(rhs, input, frame).await
            }
        }
        ExpressionNode::Block { expressions, .. } => {
            let child = frame.child();
            let mut last = Value::Undefined;
            for expr in expressions {
                last = evaluate(expr, input.clone(), &child).await?;
            }
            Ok(last)
        }
        ExpressionNode::Path { steps, keep_singleton_array, .. } => {
            path::evaluate_path(steps, *keep_singleton_array, input, frame).await
        }
        ExpressionNode::Lambda(l) => {
            let signature = match &l.signature {
                Some(raw) => Some(parse_signature(raw).map_err(|msg| {
                    EvalError::catalog(ErrorCode::T0410, l.position, &[("index", "0".to_string()), ("function", msg)])
                })?),
                None => None,
            };
            Ok(Value::Function(Arc::new(FunctionValue::Lambda {
                params: l.params.clone(),
                body: Arc::new((*l.body).clone()),
                closure: frame.clone(),
                signature,
                thunk: l.thunk,
            })))
        }
        ExpressionNode::FunctionCall { callee, args, partial, position } => {
            call::evaluate_call(callee, args, *partial, *position, input, frame).await
        }
        ExpressionNode::PartialArgPlaceholder { position } => {
            Err(EvalError::catalog(ErrorCode::F3001, *position, &[("path", "?".to_string())]))
        }
        ExpressionNode::Transform(t) => transform::evaluate_transform(t, frame),
        ExpressionNode::FlashBlock(block) => crate::flash::evaluate_flash_block(block, input, frame).await,
        ExpressionNode::FlashRule(rule) => crate::flash::evaluate_flash_rule(rule, input, frame).await,
        ExpressionNode::AstError { position, .. } => Err(EvalError::catalog(ErrorCode::S0500, *position, &[])),
    }
}
