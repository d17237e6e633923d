//! External traceback-report capability used by the rich HTML path.

use crate::record::{ExceptionInfo, RequestContext};
use thiserror::Error;

/// Failure to produce a traceback report.
#[derive(Debug, Error)]
#[error("traceback report failed: {0}")]
pub struct ReportError(String);

impl ReportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Produces a plain-text traceback report for an exception raised inside a
/// web request.
///
/// Implementations live outside this crate, typically wrapping a web
/// framework's own exception reporter. The HTML formatter escapes whatever
/// comes back, so implementations return unescaped text.
pub trait ExceptionReporter: Send + Sync {
    /// Render the report from the request context and exception snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the underlying reporter cannot build
    /// the report; the formatter then falls back to its base rendering.
    fn render(
        &self,
        request: &RequestContext,
        exception: &ExceptionInfo,
    ) -> Result<String, ReportError>;
}
