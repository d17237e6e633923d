//! HTML rendering of log records, with an optional rich traceback report.
//!
//! The base rendering escapes every interpolated record field and shows an
//! attached exception as an escaped `<pre>` block. When a traceback reporter
//! is configured and the record was created inside a web request carrying
//! body data, the rendering switches to rich mode: the base template renders
//! from a copy of the record with the exception stripped, and the reporter's
//! full report is appended instead. Any gap in that chain (no reporter, no
//! request body, reporter failure) falls back to the base rendering.

use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, default_diagnostics};
use crate::formatter::{
    FormattedText, Formatter, ParseMode, format_timestamp, level_field, source_label,
};
use crate::record::{ExceptionInfo, LogRecord};
use crate::reporter::ExceptionReporter;

use super::traceback::render_traceback;

/// Escape the four HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// HTML rendering: timestamp in `<code>`, level in `<b>`, origin and message
/// inside a `<pre>` block.
#[derive(Clone)]
pub struct HtmlFormatter {
    use_emoji: bool,
    reporter: Option<Arc<dyn ExceptionReporter>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl HtmlFormatter {
    pub fn new() -> Self {
        Self {
            use_emoji: false,
            reporter: None,
            diagnostics: default_diagnostics(),
        }
    }

    /// Prepend the severity glyph to the level field.
    #[must_use]
    pub fn with_emoji(mut self, use_emoji: bool) -> Self {
        self.use_emoji = use_emoji;
        self
    }

    /// Enable rich mode: records created inside a request with body data get
    /// a full traceback report appended, rendered by `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ExceptionReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Route report failures somewhere other than the process default sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    fn base_body(&self, record: &LogRecord) -> String {
        let mut body = format!(
            "<code>{}</code> <b>{}</b>\n<pre>From {}\n{}</pre>",
            format_timestamp(record.metadata.timestamp),
            level_field(record.level, self.use_emoji),
            escape_html(&source_label(record)),
            escape_html(&record.message),
        );
        if let Some(exception) = &record.exception {
            body.push('\n');
            body.push_str(&format!(
                "<pre>{}</pre>",
                escape_html(render_traceback(exception).trim_end())
            ));
        }
        body
    }

    /// Rich rendering; `None` means the base rendering must be used instead.
    fn rich_body(&self, record: &LogRecord, reporter: &dyn ExceptionReporter) -> Option<String> {
        let request = record.request.as_ref().filter(|request| request.has_body())?;
        // The base template renders from a copy with the exception stripped,
        // leaving the full traceback to the appended report.
        let mut stripped = record.clone();
        stripped.exception = None;
        let exception = record
            .exception
            .clone()
            .unwrap_or_else(|| ExceptionInfo::from_message(record.message.as_str()));
        match reporter.render(request, &exception) {
            Ok(report) => Some(format!(
                "{}\n\n<pre>{}</pre>",
                self.base_body(&stripped),
                escape_html(&report)
            )),
            Err(err) => {
                self.diagnostics
                    .warn(&format!("traceback report failed, using base rendering: {err}"));
                None
            }
        }
    }
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HtmlFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlFormatter")
            .field("use_emoji", &self.use_emoji)
            .field("rich", &self.reporter.is_some())
            .finish()
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, record: &LogRecord) -> FormattedText {
        let body = self
            .reporter
            .as_ref()
            .and_then(|reporter| self.rich_body(record, reporter.as_ref()))
            .unwrap_or_else(|| self.base_body(record));
        FormattedText::new(body, ParseMode::Html)
    }
}
