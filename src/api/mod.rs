//! Blocking client for the Telegram Bot API.
//!
//! One [`BotApi`] owns one `ureq` agent and performs every exchange the
//! handler needs: the `getUpdates` bootstrap, plain `sendMessage`, and the
//! `sendDocument` upload that carries formatted records. Calls run on the
//! caller's thread and are bounded by the configured timeout.

use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use ureq::{Agent, AgentBuilder};

use crate::formatter::ParseMode;

mod multipart;
mod types;

use multipart::MultipartForm;
use types::ApiResponse;
pub use types::{Chat, ChatId, Message, Update};

/// Default Bot API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
/// Default bound on each HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors raised by Bot API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Structured `{ok:false}` rejection from the API.
    #[error("{method} rejected: {description}")]
    Api {
        method: &'static str,
        error_code: Option<i64>,
        description: String,
    },
    /// Non-2xx response without a parseable rejection envelope.
    #[error("{method} returned http status {status}: {body}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },
    /// Connection, DNS, TLS, or timeout failure.
    #[error("{method} transport failure: {message}")]
    Transport {
        method: &'static str,
        message: String,
    },
    /// Response that does not match the expected shape.
    #[error("{method} returned malformed response: {detail}")]
    Malformed {
        method: &'static str,
        detail: String,
    },
}

/// Connection settings for [`BotApi`].
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Bot token issued by BotFather.
    pub token: String,
    /// API endpoint; override for self-hosted gateways and tests.
    pub base_url: String,
    /// Bound applied to connecting and to each request.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Options applied to `sendMessage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageOptions {
    /// Markup dialect of the text; `Plain` sends no `parse_mode` field.
    pub parse_mode: ParseMode,
    pub disable_notification: bool,
    pub disable_web_page_preview: bool,
}

/// Options applied to `sendDocument`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentOptions {
    pub disable_notification: bool,
}

/// Blocking Bot API client.
pub struct BotApi {
    agent: Agent,
    token: String,
    base_url: String,
    last_response: Mutex<Option<String>>,
}

impl BotApi {
    pub fn new(config: ApiConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(config.timeout)
            .timeout(config.timeout)
            .build();
        Self {
            agent,
            token: config.token,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            last_response: Mutex::new(None),
        }
    }

    /// Raw body of the most recent response, kept for debugging delivery
    /// problems. Bodies of failed exchanges are kept too.
    pub fn last_response(&self) -> Option<String> {
        self.last_response.lock().clone()
    }

    /// Fetch pending updates. Used once at startup to discover the chat that
    /// most recently messaged the bot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange fails at any layer: transport,
    /// HTTP status, rejection envelope, or response shape.
    pub fn get_updates(&self) -> Result<Vec<Update>, ApiError> {
        let response = self.agent.post(&self.method_url("getUpdates")).call();
        self.read_response("getUpdates", response)
    }

    /// Send `text` directly as a chat message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange fails at any layer.
    pub fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        options: &MessageOptions,
    ) -> Result<Message, ApiError> {
        let mut payload = serde_json::Map::new();
        payload.insert("chat_id".to_owned(), chat_id.to_json_value());
        payload.insert("text".to_owned(), serde_json::Value::from(text));
        if let Some(mode) = options.parse_mode.api_value() {
            payload.insert("parse_mode".to_owned(), serde_json::Value::from(mode));
        }
        if options.disable_notification {
            payload.insert("disable_notification".to_owned(), serde_json::Value::Bool(true));
        }
        if options.disable_web_page_preview {
            payload.insert(
                "disable_web_page_preview".to_owned(),
                serde_json::Value::Bool(true),
            );
        }
        let body = serde_json::Value::Object(payload).to_string();

        let response = self
            .agent
            .post(&self.method_url("sendMessage"))
            .set("Content-Type", "application/json")
            .send_string(&body);
        self.read_response("sendMessage", response)
    }

    /// Upload `document` as a file attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the exchange fails at any layer.
    pub fn send_document(
        &self,
        chat_id: &ChatId,
        filename: &str,
        document: &[u8],
        options: &DocumentOptions,
    ) -> Result<Message, ApiError> {
        let mut form = MultipartForm::new();
        form.text("chat_id", &chat_id.to_string());
        if options.disable_notification {
            form.text("disable_notification", "true");
        }
        form.file("document", filename, "application/octet-stream", document);
        let (content_type, body) = form.finish();

        let response = self
            .agent
            .post(&self.method_url("sendDocument"))
            .set("Content-Type", &content_type)
            .send_bytes(&body);
        self.read_response("sendDocument", response)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Common tail of every call: surface transport failures, cache the raw
    /// body, and unwrap the `{ok, result}` envelope.
    fn read_response<T: DeserializeOwned>(
        &self,
        method: &'static str,
        response: Result<ureq::Response, ureq::Error>,
    ) -> Result<T, ApiError> {
        let (status, body) = match response {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|err| ApiError::Transport {
                    method,
                    message: err.to_string(),
                })?;
                (status, body)
            }
            Err(ureq::Error::Status(status, response)) => {
                // Rejections usually arrive as non-2xx with an envelope body.
                let body = response.into_string().unwrap_or_default();
                (status, body)
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport {
                    method,
                    message: transport.to_string(),
                });
            }
        };
        *self.last_response.lock() = Some(body.clone());
        parse_envelope(method, status, &body)
    }
}

/// Decode a response body into the envelope's result. Bodies that fail to
/// parse report the HTTP status when it already signals the failure.
fn parse_envelope<T: DeserializeOwned>(
    method: &'static str,
    status: u16,
    body: &str,
) -> Result<T, ApiError> {
    match serde_json::from_str::<ApiResponse<T>>(body) {
        Ok(envelope) => envelope.into_result(method),
        Err(source) if (200..300).contains(&status) => Err(ApiError::Malformed {
            method,
            detail: source.to_string(),
        }),
        Err(_) => Err(ApiError::Status {
            method,
            status,
            body: body.to_owned(),
        }),
    }
}
