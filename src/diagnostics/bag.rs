//! Per-call diagnostics collector with error/warning/debug buckets and
//! dedup-on-insert semantics (spec §4.8).

use super::diagnostic::Diagnostic;
use rustc_hash::FxHashSet;

/// Which bucket a diagnostic belongs in, derived from its severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// severity < 30 ("warning" band cutoff, spec'd as `sev < warning`)
    Error,
    /// 30 <= severity < 40
    Warning,
    /// severity >= 40
    Debug,
}

impl Bucket {
    /// Classify a numeric severity into a bucket.
    pub fn classify(severity: i32) -> Bucket {
        if severity < 30 {
            Bucket::Error
        } else if severity < 40 {
            Bucket::Warning
        } else {
            Bucket::Debug
        }
    }
}

/// Collector for one evaluation call's diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticsBag {
    error: Vec<Diagnostic>,
    warning: Vec<Diagnostic>,
    debug: Vec<Diagnostic>,
    seen: FxHashSet<(String, String, String, usize, usize, u32, String)>,
}

impl DiagnosticsBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a diagnostic into the appropriate bucket. Returns `false` if it
    /// was a duplicate (by dedupe key) and was dropped.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        let key = diag.dedupe_key();
        if !self.seen.insert(key) {
            return false;
        }
        match Bucket::classify(diag.severity) {
            Bucket::Error => self.error.push(diag),
            Bucket::Warning => self.warning.push(diag),
            Bucket::Debug => self.debug.push(diag),
        }
        true
    }

    /// Diagnostics in the error bucket.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.error
    }

    /// Diagnostics in the warning bucket.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warning
    }

    /// Diagnostics in the debug bucket.
    pub fn debug_entries(&self) -> &[Diagnostic] {
        &self.debug
    }

    /// True if any diagnostic with severity < 10 (fatal band) was collected.
    pub fn has_fatal(&self) -> bool {
        self.error.iter().any(|d| d.severity < 10)
    }

    /// True if any diagnostic with 10 <= severity < 20 (invalid band) was
    /// collected.
    pub fn has_invalid(&self) -> bool {
        self.error.iter().any(|d| (10..20).contains(&d.severity))
    }

    /// Total number of diagnostics collected across all buckets.
    pub fn len(&self) -> usize {
        self.error.len() + self.warning.len() + self.debug.len()
    }

    /// True if no diagnostics were collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::catalog::ErrorCode;
    use std::collections::HashMap;

    fn diag(code: ErrorCode) -> Diagnostic {
        Diagnostic::new(code, Default::default(), "exec-1", 0, &HashMap::new())
    }

    #[test]
    fn buckets_by_severity_band() {
        let mut bag = DiagnosticsBag::new();
        bag.push(diag(ErrorCode::F5130)); // severity 13 -> error
        bag.push(diag(ErrorCode::F5320)); // severity 32 -> warning
        bag.push(diag(ErrorCode::F5500)); // severity 50 -> debug
        assert_eq!(bag.errors().len(), 1);
        assert_eq!(bag.warnings().len(), 1);
        assert_eq!(bag.debug_entries().len(), 1);
    }

    #[test]
    fn duplicate_entries_are_dropped() {
        let mut bag = DiagnosticsBag::new();
        assert!(bag.push(diag(ErrorCode::F5130)));
        assert!(!bag.push(diag(ErrorCode::F5130)));
        assert_eq!(bag.len(), 1);
    }
}
