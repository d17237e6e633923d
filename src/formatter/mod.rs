//! Formatter implementations for rendering records into message bodies.
//!
//! Provides the core [`Formatter`] trait, the [`SharedFormatter`] trait
//! object used across handlers, and the three built-in renderings: plain
//! text, Markdown, and HTML. Each rendering tags its output with the
//! [`ParseMode`] the destination must be told about and the file extension
//! used when the body travels as a document.

use std::time::SystemTime;
use std::{fmt, sync::Arc};

use chrono::{DateTime, Local};

use crate::level::Level;
use crate::record::LogRecord;

mod html;
mod markdown;
mod traceback;

pub use html::{HtmlFormatter, escape_html};
pub use markdown::MarkdownFormatter;
pub use traceback::render_traceback;

/// Markup dialect of a rendered message body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// No markup; the destination renders the body verbatim.
    #[default]
    Plain,
    Markdown,
    Html,
}

impl ParseMode {
    /// File extension for bodies shipped as documents.
    pub fn extension(self) -> &'static str {
        match self {
            ParseMode::Markdown => ".md",
            ParseMode::Plain | ParseMode::Html => ".html",
        }
    }

    /// Value of the destination's `parse_mode` field, absent for plain text.
    pub fn api_value(self) -> Option<&'static str> {
        match self {
            ParseMode::Plain => None,
            ParseMode::Markdown => Some("Markdown"),
            ParseMode::Html => Some("HTML"),
        }
    }
}

/// A rendered message body together with its markup tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedText {
    body: String,
    parse_mode: ParseMode,
}

impl FormattedText {
    pub fn new(body: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            body: body.into(),
            parse_mode,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl fmt::Display for FormattedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

/// Trait for formatting log records into message bodies.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait Formatter: Send + Sync {
    /// Render a log record. Takes the record by reference; implementations
    /// never mutate the caller's record.
    fn format(&self, record: &LogRecord) -> FormattedText;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn Formatter + Send + Sync>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: Formatter + Send + Sync + 'static,
    {
        let inner: Arc<dyn Formatter + Send + Sync> = Arc::from(formatter);
        Self { inner }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn Formatter + Send + Sync>) -> Self {
        Self { inner }
    }

    /// Clone the underlying trait object, incrementing the reference count.
    pub fn clone_arc(&self) -> Arc<dyn Formatter + Send + Sync> {
        Arc::clone(&self.inner)
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &LogRecord) -> FormattedText {
        self.inner.format(record)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn Formatter>)")
    }
}

/// Render a record timestamp for message bodies.
pub(crate) fn format_timestamp(timestamp: SystemTime) -> String {
    DateTime::<Local>::from(timestamp)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Level field of the message header, optionally decorated with the
/// severity glyph.
pub(crate) fn level_field(level: Level, use_emoji: bool) -> String {
    if use_emoji {
        format!("{} {}", level.emoji(), level)
    } else {
        level.to_string()
    }
}

/// `logger:function` origin label; the function segment is omitted when the
/// producer did not supply one.
pub(crate) fn source_label(record: &LogRecord) -> String {
    if record.metadata.function.is_empty() {
        record.logger.clone()
    } else {
        format!("{}:{}", record.logger, record.metadata.function)
    }
}

/// Plain-text rendering with no markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFormatter {
    use_emoji: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend the severity glyph to the level field.
    #[must_use]
    pub fn with_emoji(mut self, use_emoji: bool) -> Self {
        self.use_emoji = use_emoji;
        self
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> FormattedText {
        let mut body = format!(
            "{} {}\n[{}]\n{}",
            format_timestamp(record.metadata.timestamp),
            level_field(record.level, self.use_emoji),
            source_label(record),
            record.message,
        );
        if let Some(exception) = &record.exception {
            body.push('\n');
            body.push_str(render_traceback(exception).trim_end());
        }
        FormattedText::new(body, ParseMode::Plain)
    }
}

impl Formatter for Arc<dyn Formatter + Send + Sync> {
    fn format(&self, record: &LogRecord) -> FormattedText {
        (**self).format(record)
    }
}

impl Formatter for Box<dyn Formatter + Send + Sync> {
    fn format(&self, record: &LogRecord) -> FormattedText {
        (**self).format(record)
    }
}
