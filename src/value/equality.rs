//! Deep equality and numeric/string/boolean coercion (spec §4.5, §4.6).

use super::Value;

/// JSONata-style deep structural equality. Sequences are compared after
/// collapsing; `Undefined` is only equal to `Undefined`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| deep_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|other| deep_equal(v, other)))
        }
        (Value::FhirPrimitive(x), Value::FhirPrimitive(y)) => {
            deep_equal(&x.value, &y.value) && x.siblings.len() == y.siblings.len()
        }
        (Value::Regex(x), Value::Regex(y)) => x == y,
        (Value::Sequence(x), Value::Sequence(y)) => {
            let xi = x.items();
            let yi = y.items();
            xi.len() == yi.len() && xi.iter().zip(yi.iter()).all(|(a, b)| deep_equal(a, b))
        }
        (Value::Sequence(s), other) | (other, Value::Sequence(s)) if s.len() == 1 => {
            deep_equal(&s.items()[0], other)
        }
        _ => false,
    }
}

/// `$number`-style coercion: best-effort, non-throwing. `Undefined`
/// passes through.
pub fn to_number(value: &Value) -> Value {
    match value {
        Value::Undefined => Value::Undefined,
        Value::Number(_) => value.clone(),
        Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Undefined,
        },
        _ => Value::Undefined,
    }
}

/// `$string`-style coercion.
pub fn to_display_string(value: &Value) -> Value {
    match value {
        Value::Undefined => Value::Undefined,
        Value::String(_) => value.clone(),
        Value::Number(n) => Value::String(format_number(*n)),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Null => Value::String("null".to_string()),
        other => Value::String(serde_json::to_string(&crate::value::to_json(other)).unwrap_or_default()),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// `$boolean`-style truthiness per JSONata semantics: empty
/// string/array/object, `0`, `false`, `null`, `Undefined` are falsy.
pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => match a.len() {
            0 => false,
            1 => to_boolean(&a[0]),
            _ => true,
        },
        Value::Object(o) => !o.is_empty(),
        Value::Sequence(s) => match s.len() {
            0 => false,
            1 => to_boolean(&s.items()[0]),
            _ => true,
        },
        Value::FhirPrimitive(p) => to_boolean(&p.value),
        Value::Function(_) => true,
        Value::Regex(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_strings_compare_equal_when_coerced_manually() {
        assert!(deep_equal(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(!deep_equal(&Value::Number(1.0), &Value::String("1".into())));
    }

    #[test]
    fn falsy_values() {
        assert!(!to_boolean(&Value::Number(0.0)));
        assert!(!to_boolean(&Value::String(String::new())));
        assert!(to_boolean(&Value::Number(3.0)));
    }
}
