//! Markdown rendering of log records.

use crate::formatter::{
    FormattedText, Formatter, ParseMode, format_timestamp, level_field, source_label,
};
use crate::record::LogRecord;

use super::traceback::render_traceback;

/// Markdown rendering: timestamp in inline code, level in bold, tracebacks
/// fenced as code blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownFormatter {
    use_emoji: bool,
}

impl MarkdownFormatter {
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

impl Formatter for MarkdownFormatter {
    fn format(&self, record: &LogRecord) -> FormattedText {
        let mut body = format!(
            "`{}` *{}*\n[{}]\n{}",
            format_timestamp(record.metadata.timestamp),
            level_field(record.level, self.use_emoji),
            source_label(record),
            record.message,
        );
        if let Some(exception) = &record.exception {
            body.push('\n');
            body.push_str(&format!("```{}```", render_traceback(exception).trim_end()));
        }
        FormattedText::new(body, ParseMode::Markdown)
    }
}
