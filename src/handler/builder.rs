//! Builder for [`TelegramHandler`](super::TelegramHandler).
//!
//! Exposes destination, threshold, timeout, endpoint, formatter, and
//! diagnostic-sink configuration. Validation happens in `build`; a failing
//! chat-id bootstrap is deliberately not a build error.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::api::ChatId;
use crate::diagnostics::Diagnostics;
use crate::formatter::{Formatter, SharedFormatter};
use crate::level::Level;

use super::TelegramHandler;
use super::config::HandlerConfig;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
}

/// Builder for constructing [`TelegramHandler`] instances.
#[derive(Clone)]
pub struct TelegramHandlerBuilder {
    token: String,
    chat_id: Option<ChatId>,
    level: Option<Level>,
    timeout: Option<Duration>,
    base_url: Option<String>,
    formatter: Option<SharedFormatter>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
    disable_notification: bool,
    disable_web_page_preview: bool,
}

impl TelegramHandlerBuilder {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: None,
            level: None,
            timeout: None,
            base_url: None,
            formatter: None,
            diagnostics: None,
            disable_notification: false,
            disable_web_page_preview: false,
        }
    }

    /// Deliver to a known chat instead of discovering one at startup.
    pub fn with_chat_id(mut self, chat_id: impl Into<ChatId>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Set the minimum severity delivered. Defaults to `Trace`.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the bound applied to each HTTP request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Point the handler at a different API endpoint.
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replace the default HTML formatter.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Formatter + Send + Sync + 'static,
    {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    /// Share a formatter already wrapped for use by several handlers.
    pub fn with_shared_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Route the handler's own failures somewhere other than the process
    /// default sink.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Deliver without sound on the destination device.
    pub fn with_disable_notification(mut self, disable: bool) -> Self {
        self.disable_notification = disable;
        self
    }

    /// Suppress link previews in direct text sends.
    pub fn with_disable_web_page_preview(mut self, disable: bool) -> Self {
        self.disable_web_page_preview = disable;
        self
    }

    /// Build the handler, resolving the destination chat once.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerBuildError::InvalidConfig`] for an empty token or
    /// base URL, or a zero timeout. A failing chat-id bootstrap is not a
    /// build error: the handler comes back disabled, with the failure
    /// reported to the diagnostic sink.
    pub fn build(self) -> Result<TelegramHandler, HandlerBuildError> {
        self.validate()?;
        Ok(TelegramHandler::with_config(self.into_config()))
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.validate_token()?;
        self.validate_timeout()?;
        self.validate_base_url()?;
        Ok(())
    }

    fn validate_token(&self) -> Result<(), HandlerBuildError> {
        if self.token.trim().is_empty() {
            return Err(HandlerBuildError::InvalidConfig(
                "bot token must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn validate_timeout(&self) -> Result<(), HandlerBuildError> {
        if let Some(timeout) = self.timeout
            && timeout.is_zero()
        {
            return Err(HandlerBuildError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    fn validate_base_url(&self) -> Result<(), HandlerBuildError> {
        if let Some(base_url) = &self.base_url
            && base_url.trim().is_empty()
        {
            return Err(HandlerBuildError::InvalidConfig(
                "api base url must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn into_config(self) -> HandlerConfig {
        let defaults = HandlerConfig::new(self.token);
        HandlerConfig {
            token: defaults.token,
            chat_id: self.chat_id,
            level: self.level.unwrap_or(defaults.level),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            base_url: self.base_url.unwrap_or(defaults.base_url),
            formatter: self.formatter.unwrap_or(defaults.formatter),
            diagnostics: self.diagnostics.unwrap_or(defaults.diagnostics),
            disable_notification: self.disable_notification,
            disable_web_page_preview: self.disable_web_page_preview,
        }
    }
}
