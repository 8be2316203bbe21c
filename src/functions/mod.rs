//! Native function library (spec §4.9): the built-ins bound into the
//! root frame of every compiled expression before evaluation begins.

mod collection;
mod datetime;
mod logic;
mod math;
mod string;

use crate::evaluator::error::EvalResult;
use crate::value::{parse_signature, Frame, FunctionValue, NativeCallContext, NativeFn, Value};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Bind the entire built-in function library into `frame` (spec §6
/// per-call setup, before `$`/`%` are bound).
pub fn register_builtins(frame: &Frame) {
    collection::register(frame);
    string::register(frame);
    math::register(frame);
    datetime::register(frame);
    logic::register(frame);
}

/// Flatten a value into its constituent items the way JSONata's
/// array-typed parameters do: `Undefined` is empty, sequences/arrays
/// unwrap, everything else is a singleton.
pub(crate) fn items_of(value: Value) -> Vec<Value> {
    match value {
        Value::Undefined => Vec::new(),
        Value::Array(items) => items,
        Value::Sequence(seq) => seq.into_items(),
        other => vec![other],
    }
}

/// Build a synchronous native function value. `signature` uses the
/// grammar in spec §4.6; builtin signatures are trusted to parse.
pub(crate) fn sync_fn(
    name: &'static str,
    signature: Option<&str>,
    f: impl Fn(Value, Vec<Value>) -> EvalResult<Value> + Send + Sync + 'static,
) -> Value {
    let signature = signature.map(|s| parse_signature(s).expect("builtin signature failed to parse"));
    let func: NativeFn = Arc::new(move |ctx: NativeCallContext, args: Vec<Value>| {
        let result = f(ctx.input, args);
        Box::pin(async move { result })
    });
    Value::Function(Arc::new(FunctionValue::Native { name: name.to_string(), signature, func }))
}

/// Build an async native function value for built-ins that genuinely
/// suspend (`$eval`, `$pMap`, `$pLimit`, `$wait`).
pub(crate) fn async_fn(
    name: &'static str,
    signature: Option<&str>,
    f: impl Fn(NativeCallContext, Vec<Value>) -> BoxFuture<'static, EvalResult<Value>> + Send + Sync + 'static,
) -> Value {
    let signature = signature.map(|s| parse_signature(s).expect("builtin signature failed to parse"));
    let func: NativeFn = Arc::new(f);
    Value::Function(Arc::new(FunctionValue::Native { name: name.to_string(), signature, func }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{default_logger, DiagnosticsBag};
    use crate::policy::PolicyConfig;
    use crate::value::GlobalState;
    use std::sync::Mutex;

    pub(crate) fn test_frame() -> Frame {
        let global = Arc::new(GlobalState {
            execution_id: "test".to_string(),
            timestamp_millis: 0,
            diagnostics: Mutex::new(DiagnosticsBag::new()),
            logger: default_logger(),
            policy: PolicyConfig::default(),
            resolved: None,
            hooks: None,
        });
        Frame::root(global)
    }

    #[test]
    fn register_builtins_binds_core_names() {
        let frame = test_frame();
        register_builtins(&frame);
        for name in ["sum", "string", "not", "floor", "now"] {
            assert!(frame.lookup(name).is_some(), "missing builtin ${name}");
        }
    }
}
