//! Handler delivering log records to a Telegram chat.
//!
//! Delivery is synchronous: `emit` formats, stages, and uploads on the
//! calling thread, one record per call, with no queue and no retries.
//! `emit` never reports failure to the caller; a logging handler that
//! throws takes the application down with it, so problems go to the
//! diagnostic sink instead.

use std::fmt;
use std::io::{Read, Seek, Write};
use std::sync::Arc;

use chrono::Local;
use thiserror::Error;

use crate::api::{
    ApiConfig, ApiError, BotApi, ChatId, DocumentOptions, MessageOptions, Update,
};
use crate::diagnostics::Diagnostics;
use crate::formatter::{ParseMode, SharedFormatter};
use crate::level::Level;
use crate::record::LogRecord;

mod builder;
mod config;

pub use builder::{HandlerBuildError, TelegramHandlerBuilder};
pub use config::{DEFAULT_LEVEL, HandlerConfig};

/// Upper bound the destination places on message text, in bytes. Bodies are
/// cut to this size before upload.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Destination resolution outcome, fixed for the handler's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
enum HandlerState {
    /// Destination known; records flow.
    Ready(ChatId),
    /// Resolution failed; every call is a no-op.
    Disabled,
}

/// Internal delivery failure, mapped onto the diagnostic sink by the public
/// entry points.
#[derive(Debug, Error)]
enum DeliveryError {
    #[error("failed to stage message buffer: {0}")]
    Buffer(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Log handler that ships records to a Telegram chat as document uploads.
pub struct TelegramHandler {
    api: BotApi,
    formatter: SharedFormatter,
    state: HandlerState,
    level: Level,
    diagnostics: Arc<dyn Diagnostics>,
    disable_notification: bool,
    disable_web_page_preview: bool,
}

impl TelegramHandler {
    /// Start configuring a handler for the bot owning `token`.
    pub fn builder(token: impl Into<String>) -> TelegramHandlerBuilder {
        TelegramHandlerBuilder::new(token)
    }

    /// Construct from an assembled configuration, resolving the destination
    /// chat once. Without a configured chat id the bot's pending updates are
    /// consulted; when that fails the handler starts disabled and stays so.
    pub fn with_config(config: HandlerConfig) -> Self {
        let api = BotApi::new(ApiConfig {
            token: config.token,
            base_url: config.base_url,
            timeout: config.timeout,
        });
        let state = match config.chat_id {
            Some(chat_id) => HandlerState::Ready(chat_id),
            None => resolve_chat_id(&api, config.diagnostics.as_ref()),
        };
        Self {
            api,
            formatter: config.formatter,
            state,
            level: config.level,
            diagnostics: config.diagnostics,
            disable_notification: config.disable_notification,
            disable_web_page_preview: config.disable_web_page_preview,
        }
    }

    /// Deliver `record` to the destination chat.
    ///
    /// Never fails from the caller's point of view: disabled handlers and
    /// below-threshold records return immediately, and delivery problems are
    /// reported to the diagnostic sink.
    pub fn emit(&self, record: &LogRecord) {
        let HandlerState::Ready(chat_id) = &self.state else {
            return;
        };
        if record.level < self.level {
            return;
        }

        let text = self.formatter.format(record);
        let parse_mode = text.parse_mode();
        let body = truncate_to_limit(text.into_body(), MAX_MESSAGE_BYTES);

        if let Err(err) = self.upload(chat_id, parse_mode, &body) {
            self.report_failure(&err);
            self.diagnostics.debug(&format!(
                "delivery parameters: chat_id={chat_id}, parse_mode={parse_mode:?}, {} body bytes",
                body.len(),
            ));
        }
    }

    /// Send `text` directly as a plain chat message, outside the formatting
    /// pipeline.
    ///
    /// Shares `emit`'s contract: a disabled handler ignores the call and
    /// failures go to the diagnostic sink.
    pub fn send_message(&self, text: &str) {
        let HandlerState::Ready(chat_id) = &self.state else {
            return;
        };
        let options = MessageOptions {
            parse_mode: ParseMode::Plain,
            disable_notification: self.disable_notification,
            disable_web_page_preview: self.disable_web_page_preview,
        };
        if let Err(err) = self.api.send_message(chat_id, text, &options) {
            self.report_failure(&DeliveryError::Api(err));
        }
    }

    /// Whether destination resolution failed and the handler ignores records.
    pub fn is_disabled(&self) -> bool {
        self.state == HandlerState::Disabled
    }

    /// The destination chat, when the handler is ready.
    pub fn chat_id(&self) -> Option<&ChatId> {
        match &self.state {
            HandlerState::Ready(chat_id) => Some(chat_id),
            HandlerState::Disabled => None,
        }
    }

    /// Minimum severity delivered.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Raw body of the most recent API response, kept for debugging.
    pub fn last_response(&self) -> Option<String> {
        self.api.last_response()
    }

    /// Stage `body` in a temporary file and upload it as a document. The
    /// file lives only for the duration of the call, success or failure.
    fn upload(
        &self,
        chat_id: &ChatId,
        parse_mode: ParseMode,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let mut buffer = tempfile::Builder::new()
            .prefix("telegram-log-")
            .suffix(parse_mode.extension())
            .tempfile()?;
        buffer.write_all(body.as_bytes())?;
        buffer.rewind()?;
        let mut staged = Vec::with_capacity(body.len());
        buffer.read_to_end(&mut staged)?;

        let options = DocumentOptions {
            disable_notification: self.disable_notification,
        };
        self.api
            .send_document(chat_id, &attachment_filename(parse_mode), &staged, &options)?;
        Ok(())
    }

    fn report_failure(&self, err: &DeliveryError) {
        match err {
            // A structured rejection means the destination understood us and
            // said no; everything else is infrastructure.
            DeliveryError::Api(ApiError::Api { .. }) => {
                self.diagnostics
                    .warn(&format!("record delivery rejected: {err}"));
            }
            _ => {
                self.diagnostics
                    .error(&format!("record delivery failed: {err}"));
            }
        }
    }
}

impl fmt::Debug for TelegramHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramHandler")
            .field("state", &self.state)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// One-shot chat discovery: the chat that most recently messaged the bot.
fn resolve_chat_id(api: &BotApi, diagnostics: &dyn Diagnostics) -> HandlerState {
    let updates = match api.get_updates() {
        Ok(updates) => updates,
        Err(err) => {
            diagnostics.error(&format!("chat id resolution failed, handler disabled: {err}"));
            return HandlerState::Disabled;
        }
    };
    match latest_chat_id(&updates) {
        Some(id) => {
            diagnostics.debug(&format!("resolved chat id {id} from getUpdates"));
            HandlerState::Ready(ChatId::Id(id))
        }
        None => {
            diagnostics.error(
                "getUpdates returned no usable chat id, handler disabled; \
                 message the bot once or configure chat_id explicitly",
            );
            HandlerState::Disabled
        }
    }
}

/// Chat id of the newest pending update, when it carries a message.
fn latest_chat_id(updates: &[Update]) -> Option<i64> {
    updates
        .last()?
        .message
        .as_ref()
        .map(|message| message.chat.id)
}

/// Timestamped name shown in the chat for the uploaded document.
fn attachment_filename(parse_mode: ParseMode) -> String {
    format!(
        "{}{}",
        Local::now().format("%Y-%m-%dT%H-%M-%S"),
        parse_mode.extension()
    )
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn truncate_to_limit(mut text: String, limit: usize) -> String {
    if text.len() <= limit {
        return text;
    }
    let mut cut = limit;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text
}
