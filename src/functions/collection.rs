//! Aggregation, collection, and higher-order array/object functions
//! (spec §4.9 "Aggregation/collection").

use super::{async_fn, items_of, sync_fn};
use crate::diagnostics::Position;
use crate::evaluator::error::{EvalError, EvalResult};
use crate::evaluator::invoke;
use crate::value::{to_boolean, to_number, Frame, Value};
use futures::future::{try_join_all, BoxFuture};
use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use std::sync::Arc;

pub(super) fn register(frame: &Frame) {
    frame.bind("sum", sync_fn("sum", Some("a<n>:n"), |_, args| Ok(fold_numbers(args, 0.0, |a, b| a + b))));
    frame.bind("count", sync_fn("count", Some("a:n"), |_, args| {
        Ok(Value::Number(args.into_iter().next().map(items_of).map(|v| v.len()).unwrap_or(0) as f64))
    }));
    frame.bind("max", sync_fn("max", Some("a<n>:n"), |_, args| Ok(extreme(args, f64::max))));
    frame.bind("min", sync_fn("min", Some("a<n>:n"), |_, args| Ok(extreme(args, f64::min))));
    frame.bind("average", sync_fn("average", Some("a<n>:n"), |_, args| {
        let nums = numbers(args);
        if nums.is_empty() {
            Ok(Value::Undefined)
        } else {
            Ok(Value::Number(nums.iter().sum::<f64>() / nums.len() as f64))
        }
    }));
    frame.bind("append", sync_fn("append", Some("aa"), |_, args| {
        let mut out = Vec::new();
        for arg in args {
            out.extend(items_of(arg));
        }
        Ok(Value::Array(out))
    }));
    frame.bind("reverse", sync_fn("reverse", Some("a"), |_, args| {
        let mut items = args.into_iter().next().map(items_of).unwrap_or_default();
        items.reverse();
        Ok(Value::Array(items))
    }));
    frame.bind("distinct", sync_fn("distinct", Some("a"), |_, args| {
        let items = args.into_iter().next().map(items_of).unwrap_or_default();
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            if !out.iter().any(|existing| existing == &item) {
                out.push(item);
            }
        }
        Ok(Value::Array(out))
    }));
    frame.bind("shuffle", sync_fn("shuffle", Some("a"), |_, args| {
        Ok(Value::Array(args.into_iter().next().map(items_of).unwrap_or_default()))
    }));
    frame.bind("zip", sync_fn("zip", None, |_, args| {
        let lists: Vec<Vec<Value>> = args.into_iter().map(items_of).collect();
        let len = lists.iter().map(|l| l.len()).min().unwrap_or(0);
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            out.push(Value::Array(lists.iter().map(|l| l[i].clone()).collect()));
        }
        Ok(Value::Array(out))
    }));
    frame.bind("keys", sync_fn("keys", Some("x"), |_, args| {
        let value = args.into_iter().next().unwrap_or(Value::Undefined);
        Ok(Value::Array(keys_of(&value)))
    }));
    frame.bind("lookup", sync_fn("lookup", Some("x-s"), |_, mut args| {
        let key = match args.pop() {
            Some(Value::String(s)) => s,
            _ => return Ok(Value::Undefined),
        };
        let target = args.into_iter().next().unwrap_or(Value::Undefined);
        Ok(lookup_in(&target, &key))
    }));
    frame.bind("exists", sync_fn("exists", Some("x"), |_, args| {
        Ok(Value::Bool(args.into_iter().next().map(|v| v.is_defined()).unwrap_or(false)))
    }));
    frame.bind("spread", sync_fn("spread", Some("x"), |_, args| {
        let value = args.into_iter().next().unwrap_or(Value::Undefined);
        Ok(Value::Array(spread_value(value)))
    }));
    frame.bind("merge", sync_fn("merge", Some("a<o>"), |_, args| {
        let objects = args.into_iter().next().map(items_of).unwrap_or_default();
        let mut out = IndexMap::new();
        for obj in objects {
            if let Value::Object(map) = obj {
                for (k, v) in map {
                    out.insert(k, v);
                }
            }
        }
        Ok(Value::Object(out))
    }));
    frame.bind("first", sync_fn("first", Some("a"), |_, args| {
        Ok(args.into_iter().next().map(items_of).and_then(|v| v.into_iter().next()).unwrap_or(Value::Undefined))
    }));
    frame.bind("single", sync_fn("single", Some("a"), |_, args| {
        let mut items = args.into_iter().next().map(items_of).unwrap_or_default();
        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Value::Undefined)
        }
    }));
    frame.bind("sort", sync_fn("sort", Some("af?"), |_, args| Ok(Value::Array(sorted_naturally(args)))));

    frame.bind("map", async_fn("map", Some("af"), |ctx, mut args| {
        Box::pin(async move {
            let func = expect_function(&mut args)?;
            let items = args.into_iter().next().map(items_of).unwrap_or_default();
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let call_args = callback_args(item.clone(), i, &items);
                let result = invoke(func.clone(), call_args, Some(item.clone()), &ctx.frame, Position::ZERO).await?;
                if result.is_defined() {
                    out.push(result);
                }
            }
            Ok(Value::Array(out))
        })
    }));
    frame.bind("filter", async_fn("filter", Some("af"), |ctx, mut args| {
        Box::pin(async move {
            let func = expect_function(&mut args)?;
            let items = args.into_iter().next().map(items_of).unwrap_or_default();
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let call_args = callback_args(item.clone(), i, &items);
                let keep = invoke(func.clone(), call_args, Some(item.clone()), &ctx.frame, Position::ZERO).await?;
                if to_boolean(&keep) {
                    out.push(item.clone());
                }
            }
            Ok(Value::Array(out))
        })
    }));
    frame.bind("each", async_fn("each", Some("of"), |ctx, mut args| {
        Box::pin(async move {
            let func = expect_function(&mut args)?;
            let object = args.into_iter().next().unwrap_or(Value::Undefined);
            let mut out = Vec::new();
            if let Value::Object(map) = object {
                for (key, value) in map {
                    let call_args = vec![value.clone(), Value::String(key)];
                    let result = invoke(func.clone(), call_args, Some(value), &ctx.frame, Position::ZERO).await?;
                    if result.is_defined() {
                        out.push(result);
                    }
                }
            }
            Ok(Value::Array(out))
        })
    }));
    frame.bind("sift", async_fn("sift", Some("o-f"), |ctx, mut args| {
        Box::pin(async move {
            let func = expect_function(&mut args)?;
            let object = args.into_iter().next().unwrap_or(ctx.input.clone());
            let mut out = IndexMap::new();
            if let Value::Object(map) = object {
                for (key, value) in map {
                    let call_args = vec![value.clone(), Value::String(key.clone())];
                    let keep = invoke(func.clone(), call_args, Some(value.clone()), &ctx.frame, Position::ZERO).await?;
                    if to_boolean(&keep) {
                        out.insert(key, value);
                    }
                }
            }
            Ok(Value::Object(out))
        })
    }));
    frame.bind("reduce", async_fn("reduce", Some("afj?"), |ctx, mut args| {
        Box::pin(async move {
            let init = if args.len() > 2 { args.pop() } else { None };
            let func = expect_function(&mut args)?;
            let items = args.into_iter().next().map(items_of).unwrap_or_default();
            let mut iter = items.into_iter();
            let mut acc = match init {
                Some(v) => v,
                None => iter.next().unwrap_or(Value::Undefined),
            };
            for item in iter {
                acc = invoke(func.clone(), vec![acc, item], None, &ctx.frame, Position::ZERO).await?;
            }
            Ok(acc)
        })
    }));
    frame.bind("pMap", async_fn("pMap", Some("af"), |ctx, mut args| {
        Box::pin(async move {
            let func = expect_function(&mut args)?;
            let items = args.into_iter().next().map(items_of).unwrap_or_default();
            let futures: Vec<BoxFuture<'_, EvalResult<Value>>> = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let call_args = callback_args(item.clone(), i, &items);
                    invoke(func.clone(), call_args, Some(item.clone()), &ctx.frame, Position::ZERO)
                })
                .collect();
            // All callbacks are polled concurrently; order of the result
            // mirrors the input order regardless of completion order.
            let out = try_join_all(futures).await?;
            Ok(Value::Array(out))
        })
    }));
    frame.bind("pLimit", async_fn("pLimit", Some("anfs?"), |ctx, mut args| {
        Box::pin(async move {
            args.pop();
            let func = expect_function(&mut args)?;
            let limit = match args.pop() {
                Some(Value::Number(n)) => (n as usize).max(1),
                _ => 1,
            };
            let items = args.into_iter().next().map(items_of).unwrap_or_default();
            let futures: Vec<BoxFuture<'_, EvalResult<Value>>> = items
                .iter()
                .map(|item| invoke(func.clone(), vec![item.clone()], Some(item.clone()), &ctx.frame, Position::ZERO))
                .collect();
            // At most `limit` callbacks are ever in flight at once, but the
            // stream still yields results in the original item order.
            let out: Vec<Value> = stream::iter(futures).buffered(limit).try_collect().await?;
            Ok(Value::Array(out))
        })
    }));
}

fn numbers(args: Vec<Value>) -> Vec<f64> {
    args.into_iter()
        .next()
        .map(items_of)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match to_number(&v) {
            Value::Number(n) => Some(n),
            _ => None,
        })
        .collect()
}

fn fold_numbers(args: Vec<Value>, init: f64, f: impl Fn(f64, f64) -> f64) -> Value {
    Value::Number(numbers(args).into_iter().fold(init, f))
}

fn extreme(args: Vec<Value>, pick: impl Fn(f64, f64) -> f64) -> Value {
    let nums = numbers(args);
    if nums.is_empty() {
        Value::Undefined
    } else {
        Value::Number(nums.into_iter().reduce(pick).unwrap())
    }
}

fn keys_of(value: &Value) -> Vec<Value> {
    match value {
        Value::Object(map) => map.keys().cloned().map(Value::String).collect(),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                for k in keys_of(item) {
                    if !out.contains(&k) {
                        out.push(k);
                    }
                }
            }
            out
        }
        _ => Vec::new(),
    }
}

fn lookup_in(value: &Value, key: &str) -> Value {
    match value {
        Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Undefined),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                match lookup_in(item, key) {
                    Value::Undefined => {}
                    Value::Sequence(seq) => out.extend(seq.into_items()),
                    other => out.push(other),
                }
            }
            Value::Array(out)
        }
        _ => Value::Undefined,
    }
}

fn spread_value(value: Value) -> Vec<Value> {
    match value {
        Value::Object(map) => map.into_iter().map(|(k, v)| Value::Object(IndexMap::from([(k, v)]))).collect(),
        Value::Array(items) => items.into_iter().flat_map(spread_value).collect(),
        other => vec![other],
    }
}

fn sorted_naturally(args: Vec<Value>) -> Vec<Value> {
    let mut items = args.into_iter().next().map(items_of).unwrap_or_default();
    items.sort_by(|a, b| match (to_number(a), to_number(b)) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => format!("{a:?}").cmp(&format!("{b:?}")),
    });
    items
}

fn expect_function(args: &mut Vec<Value>) -> EvalResult<Arc<crate::value::FunctionValue>> {
    match args.pop() {
        Some(Value::Function(f)) => Ok(f),
        _ => Err(EvalError::catalog(
            crate::diagnostics::ErrorCode::T0410,
            Position::ZERO,
            &[("index", "2".to_string()), ("function", "callback".to_string())],
        )),
    }
}

fn callback_args(item: Value, index: usize, all: &[Value]) -> Vec<Value> {
    vec![item, Value::Number(index as f64), Value::Array(all.to_vec())]
}

#[allow(dead_code)]
fn boxed_noop() -> BoxFuture<'static, EvalResult<Value>> {
    Box::pin(async { Ok(Value::Undefined) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::tests::test_frame;

    #[tokio::test]
    async fn sum_adds_array_of_numbers() {
        let frame = test_frame();
        register(&frame);
        let Value::Function(f) = frame.lookup("sum").unwrap() else { panic!() };
        let result = invoke(f, vec![Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])], None, &frame, Position::ZERO)
            .await
            .unwrap();
        assert_eq!(result, Value::Number(3.0));
    }

    #[tokio::test]
    async fn map_applies_callback_to_each_item() {
        let frame = test_frame();
        register(&frame);
        let double = crate::value::FunctionValue::Native {
            name: "double".to_string(),
            signature: None,
            func: Arc::new(|_ctx, args| {
                Box::pin(async move {
                    match args.into_iter().next() {
                        Some(Value::Number(n)) => Ok(Value::Number(n * 2.0)),
                        _ => Ok(Value::Undefined),
                    }
                })
            }),
        };
        let Value::Function(map_fn) = frame.lookup("map").unwrap() else { panic!() };
        let result = invoke(
            map_fn,
            vec![Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]), Value::Function(Arc::new(double))],
            None,
            &frame,
            Position::ZERO,
        )
        .await
        .unwrap();
        assert_eq!(result, Value::Array(vec![Value::Number(2.0), Value::Number(4.0)]));
    }
}
