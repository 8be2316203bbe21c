//! Lexically-linked environments (spec §3 "Frame (scope)").

use super::Value;
use crate::diagnostics::{DiagnosticsBag, SharedLogger};
use crate::policy::PolicyConfig;
use crate::resolver::ResolvedDefinitions;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Per-call state shared by every frame created during one `evaluate()`
/// invocation; never shared across concurrent calls (spec §5 "shared
/// resource policy").
pub struct GlobalState {
    pub execution_id: String,
    pub timestamp_millis: i64,
    pub diagnostics: Mutex<DiagnosticsBag>,
    pub logger: SharedLogger,
    pub policy: PolicyConfig,
    pub resolved: Option<Arc<ResolvedDefinitions>>,
    /// Bound when hooks are installed (spec §4.5/§5 cancellation hooks).
    pub hooks: Option<Arc<dyn crate::evaluator::hooks::EvaluationHooks>>,
}

/// A lexically-linked environment: a local bindings map, a reference to
/// the enclosing frame, and a shared pointer to per-call global state.
/// Frames are created per block, per lambda invocation, per tuple step,
/// and per call.
#[derive(Clone)]
pub struct Frame {
    bindings: Arc<DashMap<String, Value>>,
    parent: Option<Arc<Frame>>,
    pub global: Arc<GlobalState>,
    /// Set during parallel expansions (array/group elements after the
    /// first) so pre/post hooks can skip double-counting (spec §5).
    pub is_parallel_call: bool,
}

impl Frame {
    /// Build the root frame for a compiled expression's evaluation call.
    pub fn root(global: Arc<GlobalState>) -> Self {
        Self { bindings: Arc::new(DashMap::new()), parent: None, global, is_parallel_call: false }
    }

    /// Create a child frame with its own local bindings map.
    pub fn child(&self) -> Self {
        if let Some(hooks) = &self.global.hooks {
            hooks.on_create_frame_push();
        }
        Self {
            bindings: Arc::new(DashMap::new()),
            parent: Some(Arc::new(self.clone())),
            global: self.global.clone(),
            is_parallel_call: false,
        }
    }

    /// Create a child frame flagged as part of a parallel expansion.
    pub fn child_parallel(&self) -> Self {
        let mut f = self.child();
        f.is_parallel_call = true;
        f
    }

    /// Bind a value in this frame's local map only.
    pub fn bind(&self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable, walking the enclosing-frame chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }
}
