//! Function invocation: resolution, partial application, signature
//! validation, and trampoline unwinding of tail-call thunks (spec §4.5).

use crate::ast::ExpressionNode;
use crate::diagnostics::{ErrorCode, Position};
use crate::evaluator::error::{EvalError, EvalResult};
use crate::value::{validate_args, Frame, FunctionValue, NativeCallContext, Value};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Evaluate `callee` and require it to be a callable value.
pub async fn resolve_callable(
    callee: &ExpressionNode,
    input: Value,
    frame: &Frame,
    position: Position,
) -> EvalResult<Arc<FunctionValue>> {
    let value = crate::evaluator::evaluate(callee, input, frame).await?;
    match value {
        Value::Function(f) => Ok(f),
        _ => Err(EvalError::catalog(ErrorCode::T1005, position, &[("name", describe(callee))])),
    }
}

fn describe(node: &ExpressionNode) -> String {
    match node {
        ExpressionNode::Variable { value, .. } => value.clone(),
        ExpressionNode::Name { value, .. } => value.clone(),
        _ => "expression".to_string(),
    }
}

/// Evaluate a `FunctionCall` node: resolve the callee, evaluate args
/// (tracking `?` placeholders for partial application), then invoke.
pub async fn evaluate_call(
    callee: &ExpressionNode,
    args: &[ExpressionNode],
    partial: bool,
    position: Position,
    input: Value,
    frame: &Frame,
) -> EvalResult<Value> {
    let func = resolve_callable(callee, input.clone(), frame, position).await?;
    let mut slots = Vec::with_capacity(args.len());
    let mut has_placeholder = false;
    for arg in args {
        if matches!(arg, ExpressionNode::PartialArgPlaceholder { .. }) {
            has_placeholder = true;
            slots.push(None);
        } else {
            let value = crate::evaluator::evaluate(arg, input.clone(), frame).await?;
            slots.push(Some(value));
        }
    }
    if partial || has_placeholder {
        return Ok(Value::Function(Arc::new(FunctionValue::Partial { inner: func, bound: slots })));
    }
    let args: Vec<Value> = slots.into_iter().map(|v| v.unwrap_or(Value::Undefined)).collect();
    invoke(func, args, Some(input), frame, position).await
}

/// Invoke `func` with `args`, unwinding any trampoline thunks produced by
/// the tail-call rewrite pass without growing the Rust call stack.
pub fn invoke<'a>(
    mut func: Arc<FunctionValue>,
    mut args: Vec<Value>,
    context: Option<Value>,
    frame: &'a Frame,
    position: Position,
) -> BoxFuture<'a, EvalResult<Value>> {
    Box::pin(async move {
        loop {
            while let FunctionValue::Partial { inner, bound } = &*func {
                let mut full = Vec::with_capacity(bound.len());
                let mut actual = args.into_iter();
                for slot in bound {
                    full.push(match slot {
                        Some(v) => v.clone(),
                        None => actual.next().unwrap_or(Value::Undefined),
                    });
                }
                full.extend(actual);
                args = full;
                func = inner.clone();
            }
            let result = invoke_once(&func, args.clone(), context.clone(), frame, position).await?;
            if let Value::Function(f) = &result {
                if matches!(&**f, FunctionValue::Lambda { thunk: true, .. }) {
                    func = f.clone();
                    args = Vec::new();
                    continue;
                }
            }
            return Ok(result);
        }
    })
}

async fn invoke_once(
    func: &FunctionValue,
    args: Vec<Value>,
    context: Option<Value>,
    frame: &Frame,
    position: Position,
) -> EvalResult<Value> {
    match func {
        FunctionValue::Native { name, signature, func } => {
            let args = match signature {
                Some(sig) => validate_args(sig, name, context.as_ref(), args, position)?.args,
                None => args,
            };
            let ctx = NativeCallContext { frame: frame.clone(), input: context.unwrap_or(Value::Undefined) };
            func(ctx, args).await
        }
        FunctionValue::Lambda { params, body, closure, signature, thunk } => {
            let args = match signature {
                Some(sig) => validate_args(sig, "lambda", context.as_ref(), args, position)?.args,
                None => args,
            };
            let child = closure.child();
            for (name, value) in params.iter().zip(args.into_iter()) {
                child.bind(name.clone(), value);
            }
            let body_input = if *thunk { Value::Undefined } else { context.unwrap_or(Value::Undefined) };
            crate::evaluator::evaluate(body, body_input, &child).await
        }
        FunctionValue::Partial { .. } => unreachable!("partial chains are unwound by invoke()"),
    }
}
