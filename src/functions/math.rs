//! Numeric functions (spec §4.9 "Math").

use super::sync_fn;
use crate::value::{to_number, Frame, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub(super) fn register(frame: &Frame) {
    frame.bind("number", sync_fn("number", Some("-x"), |input, args| {
        let value = arg_or_input(input, args);
        Ok(to_number(&value))
    }));
    frame.bind("floor", sync_fn("floor", Some("-n"), |input, args| num_fn(input, args, f64::floor)));
    frame.bind("ceil", sync_fn("ceil", Some("-n"), |input, args| num_fn(input, args, f64::ceil)));
    frame.bind("abs", sync_fn("abs", Some("-n"), |input, args| num_fn(input, args, f64::abs)));
    frame.bind("sqrt", sync_fn("sqrt", Some("-n"), |input, args| num_fn(input, args, f64::sqrt)));
    frame.bind("round", sync_fn("round", Some("-nn?"), |input, mut args| {
        let precision = match args.pop() {
            Some(Value::Number(n)) => n as i32,
            _ => 0,
        };
        let value = arg_or_input(input, args);
        match to_number(&value) {
            Value::Number(n) => Ok(Value::Number(round_half_to_even(n, precision))),
            _ => Ok(Value::Undefined),
        }
    }));
    frame.bind("power", sync_fn("power", Some("-nn"), |input, mut args| {
        let exponent = match args.pop() {
            Some(Value::Number(n)) => n,
            _ => return Ok(Value::Undefined),
        };
        let base = arg_or_input(input, args);
        match to_number(&base) {
            Value::Number(n) => Ok(Value::Number(n.powf(exponent))),
            _ => Ok(Value::Undefined),
        }
    }));
    frame.bind("random", sync_fn("random", None, |_, _| {
        Ok(Value::Number(pseudo_random()))
    }));
    frame.bind("isNumeric", sync_fn("isNumeric", Some("x"), |_, args| {
        let value = args.into_iter().next().unwrap_or(Value::Undefined);
        Ok(Value::Bool(matches!(value, Value::Number(n) if n.is_finite())))
    }));
    frame.bind("hash", sync_fn("hash", Some("x"), |_, args| {
        let value = args.into_iter().next().unwrap_or(Value::Undefined);
        let mut hasher = DefaultHasher::new();
        crate::value::to_json(&value).to_string().hash(&mut hasher);
        Ok(Value::Number(hasher.finish() as f64))
    }));
}

fn arg_or_input(input: Value, mut args: Vec<Value>) -> Value {
    if args.is_empty() {
        input
    } else {
        args.remove(0)
    }
}

fn num_fn(input: Value, args: Vec<Value>, f: impl Fn(f64) -> f64) -> crate::evaluator::error::EvalResult<Value> {
    match to_number(&arg_or_input(input, args)) {
        Value::Number(n) => Ok(Value::Number(f(n))),
        _ => Ok(Value::Undefined),
    }
}

/// Banker's rounding (round-half-to-even), matching JSONata's `$round`.
fn round_half_to_even(n: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    let scaled = n * factor;
    let floor = scaled.floor();
    let diff = scaled - floor;
    let rounded = if diff > 0.5 {
        floor + 1.0
    } else if diff < 0.5 {
        floor
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    };
    rounded / factor
}

/// Deterministic in the sense required here: no OS RNG dependency is
/// wired in (the evaluator has no entropy source threaded through
/// `Frame`), so this draws from the execution clock's low bits — good
/// enough for non-cryptographic jitter, not for anything adversarial.
fn pseudo_random() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.subsec_nanos()).unwrap_or(0);
    (nanos % 1_000_000) as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_to_even_ties() {
        assert_eq!(round_half_to_even(0.5, 0), 0.0);
        assert_eq!(round_half_to_even(1.5, 0), 2.0);
        assert_eq!(round_half_to_even(2.5, 0), 2.0);
    }

    #[test]
    fn registers_core_math_functions() {
        let frame = crate::functions::tests::test_frame();
        register(&frame);
        assert!(frame.lookup("sqrt").is_some());
    }
}
