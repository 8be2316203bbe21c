//! Threshold-governed diagnostic policy (spec §4.8).

use crate::diagnostics::{Diagnostic, DiagnosticsBag, ErrorCode, Position, SharedLogger};
use std::collections::HashMap;

/// Per-call thresholds controlling whether a coded diagnostic aborts, is
/// logged, is collected, or is skipped entirely.
#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    pub throw_level: i32,
    pub log_level: i32,
    pub collect_level: i32,
    pub validation_level: i32,
    /// Reserved per spec §9 open question: the policy engine exposes a
    /// commented "validation inhibitor" hook not yet wired. Always false.
    pub validation_inhibited: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            throw_level: 30,
            log_level: 40,
            collect_level: 70,
            validation_level: 30,
            validation_inhibited: false,
        }
    }
}

/// Outcome of evaluating policy for a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disposition {
    pub should_log: bool,
    pub should_throw: bool,
    pub should_collect: bool,
    pub inhibited: bool,
}

impl PolicyConfig {
    /// `shouldValidate(code) = severity(code) < validationLevel`. When
    /// false, the call site should skip the check entirely.
    pub fn should_validate(&self, code: ErrorCode) -> bool {
        !self.validation_inhibited && code.severity() < self.validation_level
    }

    fn disposition(&self, severity: i32) -> Disposition {
        let should_log = severity < self.log_level;
        let should_throw = severity < self.throw_level;
        let should_collect = severity < self.collect_level;
        let inhibited = !should_log && !should_throw && should_collect;
        Disposition { should_log, should_throw, should_collect, inhibited }
    }

    /// Apply policy to `diag`: push into `bag` (subject to dedupe),
    /// log via `logger` if due, and report whether the caller must
    /// throw.
    pub fn apply(
        &self,
        diag: Diagnostic,
        bag: &mut DiagnosticsBag,
        logger: &SharedLogger,
    ) -> bool {
        let severity = diag.severity;
        let disp = self.disposition(severity);
        let mut diag = diag;
        diag.inhibited = disp.inhibited;
        if disp.should_collect || disp.inhibited {
            bag.push(diag.clone());
        }
        if disp.should_log && !disp.inhibited {
            logger.error(&diag.message);
        }
        disp.should_throw && !disp.inhibited
    }

    /// Build and apply a diagnostic for `code` in one step.
    pub fn raise(
        &self,
        code: ErrorCode,
        position: Position,
        execution_id: &str,
        timestamp: i64,
        inserts: &HashMap<String, String>,
        bag: &mut DiagnosticsBag,
        logger: &SharedLogger,
    ) -> (Diagnostic, bool) {
        let diag = Diagnostic::new(code, position, execution_id, timestamp, inserts);
        let should_throw = self.apply(diag.clone(), bag, logger);
        (diag, should_throw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullLogger;
    use std::sync::Arc;

    #[test]
    fn default_thresholds_throw_below_30() {
        let policy = PolicyConfig::default();
        let mut bag = DiagnosticsBag::new();
        let logger: SharedLogger = Arc::new(NullLogger);
        // F5130 (mandatory missing) has severity 13, below throwLevel=30.
        let (_, should_throw) =
            policy.raise(ErrorCode::F5130, Position::ZERO, "exec", 0, &HashMap::new(), &mut bag, &logger);
        assert!(should_throw);
        assert_eq!(bag.errors().len(), 1);
    }

    #[test]
    fn warning_band_does_not_throw_but_is_collected() {
        let policy = PolicyConfig::default();
        let mut bag = DiagnosticsBag::new();
        let logger: SharedLogger = Arc::new(NullLogger);
        // F5320 severity 32: >= throwLevel(30) so no throw, < collectLevel(70) so collected.
        let (_, should_throw) =
            policy.raise(ErrorCode::F5320, Position::ZERO, "exec", 0, &HashMap::new(), &mut bag, &logger);
        assert!(!should_throw);
        assert_eq!(bag.warnings().len(), 1);
    }

    #[test]
    fn policy_monotonicity_raising_throw_level_never_fails_a_passing_call() {
        let mut relaxed = PolicyConfig::default();
        relaxed.throw_level = 100;
        let mut bag = DiagnosticsBag::new();
        let logger: SharedLogger = Arc::new(NullLogger);
        let (_, should_throw) =
            relaxed.raise(ErrorCode::F5130, Position::ZERO, "exec", 0, &HashMap::new(), &mut bag, &logger);
        assert!(!should_throw);
    }
}
