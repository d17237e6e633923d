//! Configuration consumed by the handler lifecycle.
//!
//! `TelegramHandlerBuilder` assembles these values before passing them to
//! [`TelegramHandler`](super::TelegramHandler) for construction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ChatId, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT};
use crate::diagnostics::{Diagnostics, default_diagnostics};
use crate::formatter::{HtmlFormatter, SharedFormatter};
use crate::level::Level;

/// Default delivery threshold: every record goes out.
pub const DEFAULT_LEVEL: Level = Level::Trace;

/// Configuration object describing how to construct a
/// [`TelegramHandler`](super::TelegramHandler).
#[derive(Clone)]
pub struct HandlerConfig {
    /// Bot token issued by BotFather.
    pub token: String,
    /// Destination chat; discovered through `getUpdates` when absent.
    pub chat_id: Option<ChatId>,
    /// Minimum severity delivered.
    pub level: Level,
    /// Bound on each HTTP request.
    pub timeout: Duration,
    /// API endpoint; override for self-hosted gateways and tests.
    pub base_url: String,
    /// Renders records into message bodies.
    pub formatter: SharedFormatter,
    /// Sink for the handler's own failures.
    pub diagnostics: Arc<dyn Diagnostics>,
    /// Deliver without sound on the destination device.
    pub disable_notification: bool,
    /// Suppress link previews in direct text sends.
    pub disable_web_page_preview: bool,
}

impl HandlerConfig {
    /// Defaults for the bot owning `token`: HTML rendering, the process
    /// diagnostic sink, and destination discovery at startup.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: None,
            level: DEFAULT_LEVEL,
            timeout: DEFAULT_TIMEOUT,
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            formatter: SharedFormatter::new(HtmlFormatter::new()),
            diagnostics: default_diagnostics(),
            disable_notification: false,
            disable_web_page_preview: false,
        }
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The token is a credential; keep it out of debug output.
        f.debug_struct("HandlerConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("level", &self.level)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .field("disable_notification", &self.disable_notification)
            .field("disable_web_page_preview", &self.disable_web_page_preview)
            .finish()
    }
}
