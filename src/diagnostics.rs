//! Secondary sink for the handler's own failures.
//!
//! Delivery must never raise into the code that logged a record, so
//! bootstrap and transport problems are reported here instead. The default
//! sink forwards to the `log` facade; embedders and tests can inject their
//! own implementation.

use once_cell::sync::Lazy;
use std::sync::Arc;

/// Target carried by every message the crate logs about itself.
///
/// The `log` bridge skips records with this target so a failing delivery
/// can never be fed back into the handler that reported it.
pub const DIAGNOSTIC_TARGET: &str = "telegram_handler";

/// Sink for the handler's own diagnostics.
pub trait Diagnostics: Send + Sync {
    /// Context worth having when tracing a failure.
    fn debug(&self, message: &str);
    /// A failure the handler absorbed but an operator should know about.
    fn warn(&self, message: &str);
    /// A failure that stops records from being delivered.
    fn error(&self, message: &str);
}

/// Default sink forwarding to the `log` facade under [`DIAGNOSTIC_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn debug(&self, message: &str) {
        log::debug!(target: DIAGNOSTIC_TARGET, "{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!(target: DIAGNOSTIC_TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: DIAGNOSTIC_TARGET, "{message}");
    }
}

static DEFAULT_DIAGNOSTICS: Lazy<Arc<dyn Diagnostics>> = Lazy::new(|| Arc::new(LogDiagnostics));

/// Process-wide default sink, shared by every handler built without an
/// explicit one.
pub fn default_diagnostics() -> Arc<dyn Diagnostics> {
    Arc::clone(&DEFAULT_DIAGNOSTICS)
}
