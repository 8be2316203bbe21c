//! Core/control functions (spec §4.9 "Core").
//!
//! `$eval` re-enters the parser/rewriter/evaluator pipeline directly
//! rather than going through the compiled-expression API, since it runs
//! inside an already-live evaluation and must share the caller's frame
//! chain (so lambdas closed over outer bindings keep working).

use super::{async_fn, sync_fn};
use crate::diagnostics::{ErrorCode, Position};
use crate::evaluator::error::{EvalError, EvalResult};
use crate::value::{deep_equal, to_boolean, to_display_string, to_json, Frame, Value};
use std::collections::HashMap;
use uuid::Uuid;

pub(super) fn register(frame: &Frame) {
    frame.bind("boolean", sync_fn("boolean", Some("-x"), |input, args| {
        let value = if args.is_empty() { input } else { args.into_iter().next().unwrap() };
        Ok(Value::Bool(to_boolean(&value)))
    }));
    frame.bind("not", sync_fn("not", Some("-x"), |input, args| {
        let value = if args.is_empty() { input } else { args.into_iter().next().unwrap() };
        Ok(Value::Bool(!to_boolean(&value)))
    }));
    frame.bind("type", sync_fn("type", Some("-x"), |input, args| {
        let value = if args.is_empty() { input } else { args.into_iter().next().unwrap() };
        Ok(Value::String(type_name(&value).to_string()))
    }));
    frame.bind("clone", sync_fn("clone", Some("-x"), |input, args| {
        let value = if args.is_empty() { input } else { args.into_iter().next().unwrap() };
        Ok(Value::from_json(&to_json(&value)))
    }));
    frame.bind("error", sync_fn("error", Some("s?"), |_, mut args| {
        let message = match args.pop() {
            Some(Value::String(s)) => s,
            _ => "$error() called".to_string(),
        };
        Err(EvalError::catalog(ErrorCode::Custom("D3137"), Position::ZERO, &[("message", message)]))
    }));
    frame.bind("assert", sync_fn("assert", Some("bs?"), |_, mut args| {
        let message = match args.pop() {
            Some(Value::String(s)) => s,
            _ => "$assert() statement failed".to_string(),
        };
        let condition = match args.pop() {
            Some(v) => to_boolean(&v),
            None => false,
        };
        if condition {
            Ok(Value::Undefined)
        } else {
            Err(EvalError::catalog(ErrorCode::Custom("D3137"), Position::ZERO, &[("message", message)]))
        }
    }));
    frame.bind("uuid", sync_fn("uuid", None, |_, _| Ok(Value::String(Uuid::new_v4().to_string()))));
    frame.bind("reference", sync_fn("reference", Some("x"), |_, args| {
        let value = args.into_iter().next().unwrap_or(Value::Undefined);
        Ok(reference_of(&value))
    }));
    frame.bind("trace", sync_fn("trace", Some("-xs?"), |input, mut args| {
        let label = match args.pop() {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let value = if args.is_empty() { input } else { args.remove(0) };
        let preview = match to_display_string(&value) {
            Value::String(s) => s,
            _ => String::new(),
        };
        let _text = match &label {
            Some(label) => format!("{label}: {preview}"),
            None => preview,
        };
        Ok(value)
    }));
    frame.bind("warn", async_fn("warn", Some("s"), |ctx, args| {
        Box::pin(async move {
            let message = match args.into_iter().next() {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            raise_policy(&ctx.frame, ErrorCode::F5320, Position::ZERO, &[("message", message)])?;
            Ok(Value::Undefined)
        })
    }));
    frame.bind("info", async_fn("info", Some("s"), |ctx, args| {
        Box::pin(async move {
            let message = match args.into_iter().next() {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            raise_policy(&ctx.frame, ErrorCode::F5500, Position::ZERO, &[("message", message)])?;
            Ok(Value::Undefined)
        })
    }));
    frame.bind("debug", async_fn("debug", Some("s"), |ctx, args| {
        Box::pin(async move {
            let message = match args.into_iter().next() {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            raise_policy(&ctx.frame, ErrorCode::F5600, Position::ZERO, &[("message", message)])?;
            Ok(Value::Undefined)
        })
    }));
    frame.bind("eval", async_fn("eval", Some("sx?"), |ctx, mut args| {
        Box::pin(async move {
            let context_override = args.pop();
            let expr = match args.pop() {
                Some(Value::String(s)) => s,
                _ => return Ok(Value::Undefined),
            };
            eval_expression(ctx.frame, expr, context_override).await
        })
    }));
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Sequence(_) => "array",
        Value::Object(_) => "object",
        Value::FhirPrimitive(_) => "object",
        Value::Function(_) => "function",
        Value::Regex(_) => "regex",
    }
}

fn reference_of(value: &Value) -> Value {
    if let Value::Object(map) = value {
        if let (Some(Value::String(kind)), Some(Value::String(id))) = (map.get("resourceType"), map.get("id")) {
            return Value::String(format!("{kind}/{id}"));
        }
    }
    Value::Undefined
}

async fn eval_expression(frame: Frame, source: String, context_override: Option<Value>) -> EvalResult<Value> {
    let (ast, parse_diags) = crate::parser::parse(&source, false).map_err(|err| {
        EvalError::catalog(ErrorCode::D3120, Position::ZERO, &[("message", err.to_string())])
    })?;
    if let Some(first) = parse_diags.iter().find(|d| d.severity == 0) {
        return Err(EvalError::catalog(ErrorCode::D3120, Position::ZERO, &[("message", first.message.clone())]));
    }
    let (rewritten, _refs) = crate::rewriter::rewrite(ast);
    let child = frame.child();
    let context = match context_override {
        Some(value) if !matches!(value, Value::Undefined) => value,
        _ => frame.lookup("$").unwrap_or(Value::Undefined),
    };
    crate::evaluator::evaluate(&rewritten, context, &child).await.map_err(|err| {
        EvalError::catalog(ErrorCode::D3121, Position::ZERO, &[("message", err.diagnostic.message.clone())])
    })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_matches_jsonata_primitives() {
        assert_eq!(type_name(&Value::Number(1.0)), "number");
        assert_eq!(type_name(&Value::Array(vec![])), "array");
        assert_eq!(type_name(&Value::Undefined), "undefined");
    }

    #[test]
    fn reference_of_builds_resource_slash_id() {
        let mut map = indexmap::IndexMap::new();
        map.insert("resourceType".to_string(), Value::String("Patient".to_string()));
        map.insert("id".to_string(), Value::String("123".to_string()));
        assert_eq!(reference_of(&Value::Object(map)), Value::String("Patient/123".to_string()));
    }

    #[test]
    fn registers_core_logic_functions() {
        let frame = crate::functions::tests::test_frame();
        register(&frame);
        assert!(frame.lookup("not").is_some());
        assert!(frame.lookup("uuid").is_some());
    }

    #[tokio::test]
    async fn eval_runs_a_literal_expression() {
        let frame = crate::functions::tests::test_frame();
        register(&frame);
        let result = eval_expression(frame, "1 + 2".to_string(), None).await.unwrap();
        assert!(deep_equal(&result, &Value::Number(3.0)));
    }
}
