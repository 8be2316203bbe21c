//! Logger abstraction bound into the per-call runtime context.

use std::sync::Arc;

/// A message sink with the four standard levels, matching the interface a
/// compiled expression's `setLogger` expects (spec §6).
pub trait Logger: Send + Sync {
    /// Log a debug-level message.
    fn debug(&self, message: &str);
    /// Log an info-level message.
    fn info(&self, message: &str);
    /// Log a warning-level message.
    fn warn(&self, message: &str);
    /// Log an error-level message.
    fn error(&self, message: &str);
}

/// A logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// A logger that forwards to the `log` crate, so host applications can
/// route fumifier diagnostics through their existing logging setup.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdLogger;

impl Logger for StdLogger {
    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }
    fn info(&self, message: &str) {
        log::info!("{message}");
    }
    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }
    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Shared handle to a logger, cloned cheaply into per-call runtime context.
pub type SharedLogger = Arc<dyn Logger>;

/// The default logger used when a compiled expression has not had
/// `set_logger` called.
pub fn default_logger() -> SharedLogger {
    Arc::new(StdLogger)
}
