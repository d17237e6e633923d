//! Telegram delivery for application log records.
//!
//! The crate renders records as plain text, Markdown, or HTML and posts them
//! to a chat through the Telegram Bot API, each message uploaded as a small
//! document so long tracebacks survive intact. Delivery never panics and
//! never surfaces an error to the caller: failures are routed to a
//! [`Diagnostics`] sink so logging cannot take the application down with it.
//!
//! A handler needs a bot token and a chat id. When no chat id is configured
//! the handler asks the Bot API for the most recent update and adopts the
//! chat that messaged the bot last; if that lookup fails the handler disables
//! itself and every later record is dropped silently.
//!
//! # Examples
//! ```no_run
//! use telegram_handler::{Level, LogRecord, TelegramHandler};
//!
//! # fn main() -> Result<(), telegram_handler::HandlerBuildError> {
//! let handler = TelegramHandler::builder("123456:bot-token")
//!     .with_chat_id(987_654_321)
//!     .with_level(Level::Warn)
//!     .build()?;
//! handler.emit(&LogRecord::new("app", Level::Error, "disk almost full"));
//! # Ok(())
//! # }
//! ```

mod api;
mod bridge;
mod diagnostics;
mod formatter;
mod handler;
mod level;
mod record;
mod reporter;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use api::{
    ApiConfig, ApiError, BotApi, Chat, ChatId, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT,
    DocumentOptions, Message, MessageOptions, Update,
};
pub use bridge::LogBridge;
pub use diagnostics::{DIAGNOSTIC_TARGET, Diagnostics, LogDiagnostics, default_diagnostics};
pub use formatter::{
    FormattedText, Formatter, HtmlFormatter, MarkdownFormatter, ParseMode, SharedFormatter,
    TextFormatter, escape_html, render_traceback,
};
pub use handler::{
    DEFAULT_LEVEL, HandlerBuildError, HandlerConfig, MAX_MESSAGE_BYTES, TelegramHandler,
    TelegramHandlerBuilder,
};
pub use level::Level;
pub use record::{ExceptionInfo, LogRecord, RecordMetadata, RequestContext, StackFrame};
pub use reporter::{ExceptionReporter, ReportError};
