//! Binary/unary operator semantics (spec §4.5): arithmetic, comparison,
//! concatenation, range, membership, predicate filtering, sort, group-by,
//! variable bind, and function application (`~>`).

use crate::ast::{BinaryOperator, ExpressionNode, UnaryOperator};
use crate::diagnostics::{ErrorCode, Position};
use crate::evaluator::call;
use crate::evaluator::error::{EvalError, EvalResult};
use crate::evaluator::path::flatten_for_step;
use crate::value::{deep_equal, to_boolean, to_display_string, to_number, Frame, Sequence, Value};
use indexmap::IndexMap;

const MAX_RANGE_SIZE: i64 = 10_000_000;

/// Unary negation.
pub fn evaluate_unary(op: UnaryOperator, value: Value, position: Position) -> EvalResult<Value> {
    match op {
        UnaryOperator::Negate => match to_number(&value) {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Undefined => Ok(Value::Undefined),
            _ => Err(EvalError::catalog(ErrorCode::T0410, position, &[("index", "1".into()), ("function", "-".into())])),
        },
    }
}

/// Dispatch a binary node. `lhs`/`rhs` are the *unevaluated* child nodes
/// so filter/sort/group/bind/focus/index can control evaluation order.
pub async fn evaluate_binary(
    op: BinaryOperator,
    lhs: &ExpressionNode,
    rhs: &ExpressionNode,
    input: Value,
    frame: &Frame,
    position: Position,
) -> EvalResult<Value> {
    match op {
        BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply | BinaryOperator::Divide
        | BinaryOperator::Modulo => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(arithmetic(op, l, r))
        }
        BinaryOperator::Equal => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(Value::Bool(deep_equal(&l, &r)))
        }
        BinaryOperator::NotEqual => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(Value::Bool(!deep_equal(&l, &r)))
        }
        BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(compare(op, l, r))
        }
        BinaryOperator::Concat => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(Value::String(format!("{}{}", display(&l), display(&r))))
        }
        BinaryOperator::Range => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            range(l, r, position)
        }
        BinaryOperator::In => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(Value::Bool(membership(&l, &r)))
        }
        BinaryOperator::And => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            if !to_boolean(&l) {
                return Ok(Value::Bool(false));
            }
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(Value::Bool(to_boolean(&r)))
        }
        BinaryOperator::Or => {
            let l = crate::evaluator::evaluate(lhs, input.clone(), frame).await?;
            if to_boolean(&l) {
                return Ok(Value::Bool(true));
            }
            let r = crate::evaluator::evaluate(rhs, input, frame).await?;
            Ok(Value::Bool(to_boolean(&r)))
        }
        BinaryOperator::Dot => crate::evaluator::evaluate(rhs, crate::evaluator::evaluate(lhs, input, frame).await?, frame).await,
        BinaryOperator::Filter => evaluate_filter(lhs, rhs, input, frame).await,
        BinaryOperator::Sort => evaluate_sort(lhs, rhs, input, frame, position).await,
        BinaryOperator::Group => evaluate_group(lhs, rhs, input, frame).await,
        BinaryOperator::Bind => {
            let value = crate::evaluator::evaluate(rhs, input, frame).await?;
            if let ExpressionNode::Variable { value: name, .. } = lhs {
                frame.bind(name.clone(), value.clone());
            }
            Ok(value)
        }
        BinaryOperator::Focus => {
            let focus_target = input.clone();
            let value = crate::evaluator::evaluate(lhs, input, frame).await?;
            if let ExpressionNode::Variable { value: name, .. } = rhs {
                frame.bind(name.clone(), focus_target);
            }
            Ok(value)
        }
        BinaryOperator::Index => {
            let value = crate::evaluator::evaluate(lhs, input, frame).await?;
            if let ExpressionNode::Variable { value: name, .. } = rhs {
                frame.bind(name.clone(), Value::Number(0.0));
            }
            Ok(value)
        }
        BinaryOperator::Apply => evaluate_apply(lhs, rhs, input, frame, position).await,
    }
}

fn arithmetic(op: BinaryOperator, l: Value, r: Value) -> Value {
    let (Value::Number(a), Value::Number(b)) = (to_number(&l), to_number(&r)) else {
        return Value::Undefined;
    };
    match op {
        BinaryOperator::Add => Value::Number(a + b),
        BinaryOperator::Subtract => Value::Number(a - b),
        BinaryOperator::Multiply => Value::Number(a * b),
        BinaryOperator::Divide => Value::Number(a / b),
        BinaryOperator::Modulo => Value::Number(a % b),
        _ => unreachable!(),
    }
}

fn compare(op: BinaryOperator, l: Value, r: Value) -> Value {
    let ordering = match (&l, &r) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (to_number(&l), to_number(&r)) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };
    let Some(ordering) = ordering else {
        return Value::Undefined;
    };
    let result = match op {
        BinaryOperator::LessThan => ordering.is_lt(),
        BinaryOperator::LessThanOrEqual => ordering.is_le(),
        BinaryOperator::GreaterThan => ordering.is_gt(),
        BinaryOperator::GreaterThanOrEqual => ordering.is_ge(),
        _ => unreachable!(),
    };
    Value::Bool(result)
}

fn display(v: &Value) -> String {
    match to_display_string(v) {
        Value::String(s) => s,
        _ => String::new(),
    }
}

fn range(l: Value, r: Value, position: Position) -> EvalResult<Value> {
    let (Value::Number(a), Value::Number(b)) = (to_number(&l), to_number(&r)) else {
        return Ok(Value::Undefined);
    };
    let (start, end) = (a as i64, b as i64);
    if end < start {
        return Ok(Value::Undefined);
    }
    if end - start + 1 > MAX_RANGE_SIZE {
        return Err(EvalError::catalog(ErrorCode::D2014, position, &[]));
    }
    Ok(Value::Array((start..=end).map(|n| Value::Number(n as f64)).collect()))
}

fn membership(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| deep_equal(needle, item)),
        Value::Sequence(seq) => seq.items().iter().any(|item| deep_equal(needle, item)),
        other => deep_equal(needle, other),
    }
}

async fn evaluate_filter(
    lhs: &ExpressionNode,
    rhs: &ExpressionNode,
    input: Value,
    frame: &Frame,
) -> EvalResult<Value> {
    let base = crate::evaluator::evaluate(lhs, input, frame).await?;
    let items = flatten_for_step(base);
    if let Some(index) = static_index(rhs) {
        return Ok(select_index(items, index));
    }
    let mut out = Sequence::new();
    for (i, item) in items.iter().enumerate() {
        let predicate = crate::evaluator::evaluate(rhs, item.clone(), frame).await?;
        let keep = match &predicate {
            Value::Number(n) => (*n as i64) == i as i64 || (*n < 0.0 && (*n as i64 + items.len() as i64) == i as i64),
            other => to_boolean(other),
        };
        if keep {
            out.push(item.clone());
        }
    }
    Ok(out.collapse())
}

/// Recognize a purely literal (possibly negated) numeric index so a
/// filter step can select positionally instead of per-item predicate.
fn static_index(node: &ExpressionNode) -> Option<i64> {
    match node {
        ExpressionNode::Literal { value: serde_json::Value::Number(n), .. } => n.as_f64().map(|f| f as i64),
        ExpressionNode::Unary { op: UnaryOperator::Negate, expr, .. } => static_index(expr).map(|n| -n),
        _ => None,
    }
}

fn select_index(items: Vec<Value>, index: i64) -> Value {
    let len = items.len() as i64;
    let real = if index < 0 { len + index } else { index };
    if real < 0 || real >= len {
        Value::Undefined
    } else {
        items.into_iter().nth(real as usize).unwrap_or(Value::Undefined)
    }
}

async fn evaluate_sort(
    lhs: &ExpressionNode,
    rhs: &ExpressionNode,
    input: Value,
    frame: &Frame,
    position: Position,
) -> EvalResult<Value> {
    let base = crate::evaluator::evaluate(lhs, input, frame).await?;
    let mut items = flatten_for_step(base);
    let ExpressionNode::ArrayConstructor { items: terms, .. } = rhs else {
        return Ok(Value::Array(items));
    };
    let mut keyed = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        let mut keys = Vec::with_capacity(terms.len());
        for term in terms {
            let (descending, expr) = match term {
                ExpressionNode::Unary { op: UnaryOperator::Negate, expr, .. } => (true, expr.as_ref()),
                other => (false, other),
            };
            let key = crate::evaluator::evaluate(expr, item.clone(), frame).await?;
            keys.push((descending, key));
        }
        keyed.push((keys, item));
    }
    let mut error = None;
    keyed.sort_by(|(a_keys, _), (b_keys, _)| {
        for ((descending, a), (_, b)) in a_keys.iter().zip(b_keys.iter()) {
            let ord = match (a, b) {
                (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
                (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
                _ => {
                    error.get_or_insert(ErrorCode::T2008);
                    None
                }
            };
            let Some(ord) = ord else { continue };
            let ord = if *descending { ord.reverse() } else { ord };
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
    if let Some(code) = error {
        return Err(EvalError::catalog(code, position, &[]));
    }
    Ok(Value::Array(keyed.into_iter().map(|(_, v)| v).collect()))
}

async fn evaluate_group(
    lhs: &ExpressionNode,
    rhs: &ExpressionNode,
    input: Value,
    frame: &Frame,
) -> EvalResult<Value> {
    let base = crate::evaluator::evaluate(lhs, input, frame).await?;
    let items = flatten_for_step(base);
    let ExpressionNode::ObjectConstructor { pairs, position } = rhs else {
        return Ok(Value::Undefined);
    };
    if pairs.is_empty() {
        return Ok(Value::Undefined);
    }

    // Every item is tried against every key expression; a key already
    // claimed by a different pair is a conflict (D1009), mirroring the
    // plain object constructor's duplicate-key check.
    struct Group {
        data: Vec<Value>,
        pair_index: usize,
    }
    let mut groups: IndexMap<String, Group> = IndexMap::new();
    for item in &items {
        for (pair_index, (key_expr, _)) in pairs.iter().enumerate() {
            let key_value = crate::evaluator::evaluate(key_expr, item.clone(), frame).await?;
            if !key_value.is_defined() {
                continue;
            }
            let key = display(&key_value);
            match groups.get_mut(&key) {
                Some(group) if group.pair_index == pair_index => group.data.push(item.clone()),
                Some(_) => return Err(EvalError::catalog(ErrorCode::D1009, *position, &[("key", key)])),
                None => {
                    groups.insert(key, Group { data: vec![item.clone()], pair_index });
                }
            }
        }
    }

    let mut out = IndexMap::new();
    for (key, group) in groups {
        let value_expr = &pairs[group.pair_index].1;
        let value = crate::evaluator::evaluate(value_expr, Value::Array(group.data), frame).await?;
        out.insert(key, value);
    }
    Ok(Value::Object(out))
}

async fn evaluate_apply(
    lhs: &ExpressionNode,
    rhs: &ExpressionNode,
    input: Value,
    frame: &Frame,
    position: Position,
) -> EvalResult<Value> {
    let piped = crate::evaluator::evaluate(lhs, input, frame).await?;
    match rhs {
        ExpressionNode::FunctionCall { callee, args, partial: false, .. } => {
            let func = call::resolve_callable(callee, piped.clone(), frame, position).await?;
            let mut arg_values = vec![piped.clone()];
            for arg in args {
                arg_values.push(crate::evaluator::evaluate(arg, piped.clone(), frame).await?);
            }
            call::invoke(func, arg_values, Some(piped), frame, position).await
        }
        other => {
            let func_value = crate::evaluator::evaluate(other, piped.clone(), frame).await?;
            let Value::Function(func) = func_value else {
                return Err(EvalError::catalog(
                    ErrorCode::T1005,
                    position,
                    &[("name", "~>".to_string())],
                ));
            };
            call::invoke(func, vec![piped.clone()], Some(piped), frame, position).await
        }
    }
}
