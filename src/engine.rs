//! Compiled-expression interface (spec §6): ties parsing, rewriting,
//! FLASH resolution, and evaluation together behind a handle that can be
//! invoked repeatedly, with independent per-call state each time.

use crate::ast::ExpressionNode;
use crate::diagnostics::{default_logger, Diagnostic, DiagnosticsBag, SharedLogger};
use crate::evaluator::{evaluate, EvalError};
use crate::functions;
use crate::parser::{self, ParseError};
use crate::policy::PolicyConfig;
use crate::resolver::{resolve, ResolvedDefinitions, StructureNavigator};
use crate::rewriter::{rewrite, CollectedRefs};
use crate::value::{parse_signature, Frame, FunctionValue, GlobalState, NativeFn, Value};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// Either a source text to parse, or an already-produced AST (e.g. from
/// a prior call's [`CompiledExpression::ast`]) to recompile directly.
pub enum Source {
    Text(String),
    Ast(ExpressionNode),
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Source::Text(value.to_string())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source::Text(value)
    }
}

impl From<ExpressionNode> for Source {
    fn from(value: ExpressionNode) -> Self {
        Source::Ast(value)
    }
}

/// Options accepted by [`fumifier`].
#[derive(Default)]
pub struct EngineOptions {
    /// Enable parse/resolve error recovery (spec §4.2/§4.4).
    pub recover: bool,
    /// Required when the source contains FLASH.
    pub navigator: Option<Arc<dyn StructureNavigator>>,
    pub policy: PolicyConfig,
}

/// Failure compiling a source or AST into a [`CompiledExpression`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("FLASH resolution failed: {}", join_messages(.0))]
    Resolution(Vec<Diagnostic>),
    #[error("expression contains FLASH but no StructureNavigator was supplied")]
    MissingNavigator,
}

fn join_messages(diags: &[Diagnostic]) -> String {
    diags.iter().map(|d| d.message.as_str()).collect::<Vec<_>>().join("; ")
}

/// `{ok, status, result, diagnostics, executionId}` — the non-throwing
/// counterpart to [`CompiledExpression::evaluate`] (spec §6).
pub struct VerboseReport {
    pub ok: bool,
    pub status: u16,
    pub result: Option<Value>,
    pub diagnostics: Vec<Diagnostic>,
    pub execution_id: String,
}

/// A parsed, rewritten, (if needed) FLASH-resolved expression ready to be
/// evaluated any number of times. Concurrent `evaluate()` calls on the
/// same instance never observe each other's `$`, `$millis`, or
/// diagnostics bag (spec §5 "shared resource policy").
pub struct CompiledExpression {
    ast: ExpressionNode,
    parse_errors: Vec<Diagnostic>,
    refs: CollectedRefs,
    resolved: Option<Arc<ResolvedDefinitions>>,
    static_bindings: DashMap<String, Value>,
    policy: PolicyConfig,
    logger: Mutex<SharedLogger>,
}

/// Compile `source` (text or a previously produced AST) into a reusable
/// expression handle (spec §6 "Compilation entry").
pub async fn fumifier(
    source: impl Into<Source>,
    options: EngineOptions,
) -> Result<CompiledExpression, EngineError> {
    let (ast, parse_errors) = match source.into() {
        Source::Text(text) => parser::parse(&text, options.recover)?,
        Source::Ast(ast) => (ast, Vec::new()),
    };
    let (ast, refs) = rewrite(ast);

    let mut compile_errors = parse_errors;
    let resolved = if refs.contains_flash {
        let navigator = options.navigator.clone().ok_or(EngineError::MissingNavigator)?;
        let (defs, resolution_errors) = resolve(&refs, navigator.as_ref(), options.recover)
            .await
            .map_err(EngineError::Resolution)?;
        compile_errors.extend(resolution_errors);
        Some(Arc::new(defs))
    } else {
        None
    };

    Ok(CompiledExpression {
        ast,
        parse_errors: compile_errors,
        refs,
        resolved,
        static_bindings: DashMap::new(),
        policy: options.policy,
        logger: Mutex::new(default_logger()),
    })
}

impl CompiledExpression {
    /// The immutable, JSON-serializable AST (spec §6 "persisted state").
    pub fn ast(&self) -> &ExpressionNode {
        &self.ast
    }

    /// Parse- and resolution-time errors collected when compiled with
    /// `recover: true` (empty otherwise, since a non-recovering compile
    /// fails fast on the first one instead of reaching here).
    pub fn errors(&self) -> &[Diagnostic] {
        &self.parse_errors
    }

    /// Whether this expression contains any FLASH construct.
    pub fn contains_flash(&self) -> bool {
        self.refs.contains_flash
    }

    /// Bind a value in the static scope shared by every subsequent call.
    pub fn assign(&self, name: impl Into<String>, value: Value) {
        self.static_bindings.insert(name.into(), value);
    }

    /// Register a user-implemented native function in the static scope.
    pub fn register_function(
        &self,
        name: impl Into<String>,
        signature: Option<&str>,
        func: NativeFn,
    ) -> Result<(), String> {
        let name = name.into();
        let signature = signature.map(parse_signature).transpose()?;
        self.static_bindings
            .insert(name.clone(), Value::Function(Arc::new(FunctionValue::Native { name, signature, func })));
        Ok(())
    }

    /// Replace the logger used by every subsequent call.
    pub fn set_logger(&self, logger: SharedLogger) {
        *self.logger.lock().unwrap() = logger;
    }

    fn build_call(&self, input: &Value, bindings: &[(String, Value)]) -> (Frame, Arc<GlobalState>) {
        let execution_id = Uuid::new_v4().to_string();
        let global = Arc::new(GlobalState {
            execution_id: execution_id.clone(),
            timestamp_millis: Utc::now().timestamp_millis(),
            diagnostics: Mutex::new(DiagnosticsBag::new()),
            logger: self.logger.lock().unwrap().clone(),
            policy: self.policy,
            resolved: self.resolved.clone(),
            hooks: None,
        });
        let frame = Frame::root(global.clone());
        functions::register_builtins(&frame);
        for entry in self.static_bindings.iter() {
            frame.bind(entry.key().clone(), entry.value().clone());
        }
        for (name, value) in bindings {
            frame.bind(name.clone(), value.clone());
        }
        frame.bind("$", input.clone().wrap_outer());
        frame.bind("executionId", Value::String(execution_id));
        (frame, global)
    }

    /// Evaluate against `input` (spec §6). Throws (returns `Err`) on any
    /// diagnostic the policy engine decides must be fatal.
    pub async fn evaluate(&self, input: Value, bindings: &[(String, Value)]) -> Result<Value, EvalError> {
        let (frame, _global) = self.build_call(&input, bindings);
        evaluate(&self.ast, input, &frame).await
    }

    /// Non-throwing counterpart: collects every diagnostic instead of
    /// propagating the first fatal one (spec §6 "evaluateVerbose").
    pub async fn evaluate_verbose(&self, input: Value, bindings: &[(String, Value)]) -> VerboseReport {
        let (frame, global) = self.build_call(&input, bindings);
        let result = evaluate(&self.ast, input, &frame).await;
        let bag = global.diagnostics.lock().unwrap();
        let mut diagnostics: Vec<Diagnostic> =
            bag.errors().iter().chain(bag.warnings()).chain(bag.debug_entries()).cloned().collect();
        let fatal_band = bag.has_fatal() || bag.has_invalid();
        drop(bag);
        match result {
            Ok(value) => {
                let status = if fatal_band { 422 } else if diagnostics.is_empty() { 200 } else { 206 };
                VerboseReport { ok: status != 422, status, result: Some(value), diagnostics, execution_id: global.execution_id.clone() }
            }
            Err(err) => {
                diagnostics.push(err.diagnostic);
                VerboseReport { ok: false, status: 422, result: None, diagnostics, execution_id: global.execution_id.clone() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn compiles_and_evaluates_a_plain_expression() {
        let compiled = fumifier("1 + 2", EngineOptions::default()).await.unwrap();
        let result = compiled.evaluate(Value::Undefined, &[]).await.unwrap();
        assert_eq!(result, Value::Number(3.0));
    }

    #[tokio::test]
    async fn flash_without_navigator_is_rejected() {
        let err = fumifier("InstanceOf: Patient\n* active = true\n", EngineOptions::default()).await;
        assert!(matches!(err, Err(EngineError::MissingNavigator)));
    }

    #[tokio::test]
    async fn verbose_report_is_ok_for_a_clean_evaluation() {
        let compiled = fumifier("1 + 2", EngineOptions::default()).await.unwrap();
        let report = compiled.evaluate_verbose(Value::Undefined, &[]).await;
        assert!(report.ok);
        assert_eq!(report.status, 200);
        assert_eq!(report.result, Some(Value::Number(3.0)));
    }

    #[tokio::test]
    async fn assign_binds_into_every_subsequent_call() {
        let compiled = fumifier("$greeting", EngineOptions::default()).await.unwrap();
        compiled.assign("greeting", Value::String("hi".to_string()));
        let result = compiled.evaluate(Value::Undefined, &[]).await.unwrap();
        assert_eq!(result, Value::String("hi".to_string()));
    }
}
