//! Function signature grammar and validator (spec §4.6).
//!
//! Grammar: `s` string, `n` number, `b` boolean, `o` object, `a` array,
//! `f` function, `j` JSON (any scalar/composite), `x` any, `(...)` union,
//! `<...>` typed array element, `?` optional, `+` one-or-more,
//! `-` context-defaulted, trailing `:T` return type.

use super::equality::to_boolean;
use super::Value;
use crate::diagnostics::{ErrorCode, Position};
use std::fmt;

/// One parameter slot in a parsed signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub types: Vec<ParamType>,
    pub optional: bool,
    pub one_or_more: bool,
    pub context_default: bool,
}

/// A single accepted type for a parameter (or array-element type).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array(Option<Box<ParamType>>),
    Function,
    Json,
    Any,
}

/// A parsed signature: its parameter list and optional return type.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub return_type: Option<ParamType>,
    raw: String,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Parse a signature literal such as `<s-n?s?:s>` (the `<` `>` delimiters
/// are assumed already stripped by the caller).
pub fn parse_signature(raw: &str) -> Result<Signature, String> {
    let mut chars = raw.chars().peekable();
    let mut params = Vec::new();
    let mut return_type = None;

    while let Some(&c) = chars.peek() {
        if c == ':' {
            chars.next();
            let rest: String = chars.by_ref().collect();
            return_type = Some(parse_type(&rest)?.0);
            break;
        }
        let context_default = c == '-';
        if context_default {
            chars.next();
        }
        let (ty, rest_after_type) = parse_type_from_iter(&mut chars)?;
        let _ = rest_after_type;
        let mut types = vec![ty];
        while chars.peek() == Some(&'|') {
            chars.next();
            let (ty2, _) = parse_type_from_iter(&mut chars)?;
            types.push(ty2);
        }
        let mut optional = false;
        let mut one_or_more = false;
        match chars.peek() {
            Some('?') => {
                optional = true;
                chars.next();
            }
            Some('+') => {
                one_or_more = true;
                chars.next();
            }
            _ => {}
        }
        params.push(Param { types, optional, one_or_more, context_default });
    }

    Ok(Signature { params, return_type, raw: raw.to_string() })
}

fn parse_type(rest: &str) -> Result<(ParamType, &str), String> {
    let mut it = rest.chars().peekable();
    parse_type_from_iter(&mut it)
        .map(|(ty, _)| (ty, ""))
}

fn parse_type_from_iter(
    chars: &mut std::iter::Peekable<impl Iterator<Item = char>>,
) -> Result<(ParamType, ()), String> {
    match chars.next() {
        Some('s') => Ok((ParamType::String, ())),
        Some('n') => Ok((ParamType::Number, ())),
        Some('b') => Ok((ParamType::Boolean, ())),
        Some('o') => Ok((ParamType::Object, ())),
        Some('f') => Ok((ParamType::Function, ())),
        Some('j') => Ok((ParamType::Json, ())),
        Some('x') => Ok((ParamType::Any, ())),
        Some('a') => {
            if chars.peek() == Some(&'<') {
                chars.next();
                let (inner, _) = parse_type_from_iter(chars)?;
                if chars.next() != Some('>') {
                    return Err("expected '>' closing array element type".to_string());
                }
                Ok((ParamType::Array(Some(Box::new(inner))), ()))
            } else {
                Ok((ParamType::Array(None), ()))
            }
        }
        Some(other) => Err(format!("unexpected signature character '{other}'")),
        None => Err("unexpected end of signature".to_string()),
    }
}

impl ParamType {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::Any, _) | (ParamType::Json, _) => true,
            (ParamType::String, Value::String(_)) => true,
            (ParamType::Number, Value::Number(_)) => true,
            (ParamType::Boolean, Value::Bool(_)) => true,
            (ParamType::Object, Value::Object(_)) => true,
            (ParamType::Function, Value::Function(_)) => true,
            (ParamType::Array(_), Value::Array(_) | Value::Sequence(_)) => true,
            _ => false,
        }
    }
}

/// Outcome of validating one actual argument list against a signature.
pub struct ValidatedArgs {
    pub args: Vec<Value>,
}

/// Validate and coerce `args` (with `context` supplied for `-`-marked
/// params missing an argument) against `sig`. Errors map to T0410-T0412.
pub fn validate_args(
    sig: &Signature,
    function_name: &str,
    context: Option<&Value>,
    mut args: Vec<Value>,
    position: Position,
) -> Result<ValidatedArgs, crate::evaluator::error::EvalError> {
    use crate::evaluator::error::EvalError;

    let mut out = Vec::with_capacity(sig.params.len());
    let mut arg_iter = args.drain(..);
    for (i, param) in sig.params.iter().enumerate() {
        let actual = match arg_iter.next() {
            Some(v) => Some(v),
            None if param.context_default => context.cloned(),
            None if param.optional => None,
            None => {
                return Err(EvalError::catalog(
                    ErrorCode::T0410,
                    position,
                    &[("index", (i + 1).to_string()), ("function", function_name.to_string())],
                ));
            }
        };
        let Some(mut value) = actual else {
            out.push(Value::Undefined);
            continue;
        };
        if param.types.len() == 1 {
            if let ParamType::Array(Some(elem_ty)) = &param.types[0] {
                value = coerce_to_array(value);
                if let Value::Array(items) = &value {
                    if !items.iter().all(|v| elem_ty.matches(v)) {
                        return Err(EvalError::catalog(
                            ErrorCode::T0412,
                            position,
                            &[
                                ("index", (i + 1).to_string()),
                                ("function", function_name.to_string()),
                                ("type", format!("{elem_ty:?}")),
                            ],
                        ));
                    }
                }
            }
        }
        let ok = param.types.iter().any(|t| t.matches(&value)) || matches!(value, Value::Undefined);
        if !ok {
            let code = if param.context_default { ErrorCode::T0411 } else { ErrorCode::T0410 };
            return Err(EvalError::catalog(
                code,
                position,
                &[("index", (i + 1).to_string()), ("function", function_name.to_string())],
            ));
        }
        out.push(value);
    }
    for rest in arg_iter {
        out.push(rest);
    }
    Ok(ValidatedArgs { args: out })
}

fn coerce_to_array(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        Value::Sequence(seq) => Value::Array(seq.into_items()),
        Value::Undefined => Value::Array(Vec::new()),
        other => Value::Array(vec![other]),
    }
}

/// Whether `value` is truthy, used by signature-adjacent call sites that
/// need boolean coercion without importing `equality` directly.
pub fn is_truthy(value: &Value) -> bool {
    to_boolean(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_signature() {
        let sig = parse_signature("s-n?s?:s").unwrap();
        assert_eq!(sig.params.len(), 3);
        assert!(sig.params[0].context_default);
        assert!(sig.params[1].optional);
        assert_eq!(sig.return_type, Some(ParamType::String));
    }

    #[test]
    fn parses_typed_array() {
        let sig = parse_signature("a<s>").unwrap();
        assert_eq!(sig.params.len(), 1);
        assert!(matches!(sig.params[0].types[0], ParamType::Array(Some(_))));
    }
}
