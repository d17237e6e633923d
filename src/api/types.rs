//! Wire types exchanged with the Bot API.

use std::fmt;

use serde::Deserialize;

use super::ApiError;

/// Destination chat identity: a numeric id or a public `@username`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl ChatId {
    /// JSON representation used in request payloads: ids stay numeric,
    /// usernames stay strings.
    pub(crate) fn to_json_value(&self) -> serde_json::Value {
        match self {
            ChatId::Id(id) => serde_json::Value::from(*id),
            ChatId::Username(name) => serde_json::Value::from(name.as_str()),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{id}"),
            ChatId::Username(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(name: &str) -> Self {
        Self::Username(name.to_owned())
    }
}

impl From<String> for ChatId {
    fn from(name: String) -> Self {
        Self::Username(name)
    }
}

/// Envelope every Bot API method wraps its result in.
///
/// `result` must stay free of serde attributes that would grow the derived
/// impl's bounds beyond `T: Deserialize`; a missing field already
/// deserializes to `None`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope into the carried result or a structured rejection.
    pub fn into_result(self, method: &'static str) -> Result<T, ApiError> {
        if !self.ok {
            return Err(ApiError::Api {
                method,
                error_code: self.error_code,
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_owned()),
            });
        }
        self.result.ok_or(ApiError::Malformed {
            method,
            detail: "envelope is ok but carries no result".to_owned(),
        })
    }
}

/// One entry returned by `getUpdates`.
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// A chat message, as echoed back by send methods and carried in updates.
#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}
