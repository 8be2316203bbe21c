//! Function values: lambdas, native functions, and partial applications
//! (spec §3 ownership notes, §4.5 function call semantics).

use super::{Frame, Signature, Value};
use crate::ast::ExpressionNode;
use crate::evaluator::error::EvalError;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Context handed to a native function: the `this`-like focus object
/// {environment, input} from spec §4.5.
pub struct NativeCallContext {
    pub frame: Frame,
    pub input: Value,
}

/// A Rust-implemented native function body.
pub type NativeFn =
    Arc<dyn Fn(NativeCallContext, Vec<Value>) -> BoxFuture<'static, Result<Value, EvalError>> + Send + Sync>;

/// A callable value: a user lambda, a native function, or a partial
/// application of either.
#[derive(Clone)]
pub enum FunctionValue {
    Lambda {
        params: Vec<String>,
        body: Arc<ExpressionNode>,
        closure: Frame,
        signature: Option<Signature>,
        /// Set by the tail-call rewrite; unwound by the evaluator trampoline.
        thunk: bool,
    },
    Native {
        name: String,
        signature: Option<Signature>,
        func: NativeFn,
    },
    Partial {
        inner: Arc<FunctionValue>,
        /// `None` entries are the remaining placeholder (`?`) slots.
        bound: Vec<Option<Value>>,
    },
}

impl FunctionValue {
    /// Name used in diagnostics (`T1005` etc.).
    pub fn name(&self) -> String {
        match self {
            FunctionValue::Lambda { .. } => "lambda".to_string(),
            FunctionValue::Native { name, .. } => name.clone(),
            FunctionValue::Partial { inner, .. } => inner.name(),
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({})", self.name())
    }
}
