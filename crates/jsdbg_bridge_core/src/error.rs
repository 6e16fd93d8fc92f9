use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsdbgError {
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Remote error: {0}")]
    Remote(RemoteError),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Structured error body returned by the debug service:
/// `{"errorResponse": {"messageCode": "...", "message": "...", ...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub message_code: String,
    pub message: String,
    pub raw: Value,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.message_code)
        } else {
            write!(f, "{} - {}", self.message_code, self.message)
        }
    }
}

impl RemoteError {
    /// Returns `None` unless the body carries an `errorResponse.messageCode` string.
    pub fn from_body(body: &str) -> Option<Self> {
        let raw: Value = serde_json::from_str(body).ok()?;
        let error_response = raw.get("errorResponse")?;
        let message_code = error_response.get("messageCode")?.as_str()?.to_string();
        let message = error_response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            message_code,
            message,
            raw,
        })
    }
}

impl JsdbgError {
    pub fn remote(message_code: impl Into<String>, message: impl Into<String>) -> Self {
        let message_code = message_code.into();
        let message = message.into();
        let raw = serde_json::json!({
            "errorResponse": {
                "messageCode": message_code,
                "message": message,
            }
        });
        Self::Remote(RemoteError {
            message_code,
            message,
            raw,
        })
    }

    /// Builds the error for a non-success HTTP status, preferring the structured body.
    pub fn from_http(status: u16, body: String) -> Self {
        match RemoteError::from_body(&body) {
            Some(remote) => Self::Remote(remote),
            None => Self::Http { status, body },
        }
    }

    pub fn message_code(&self) -> Option<&str> {
        match self {
            Self::Remote(remote) => Some(remote.message_code.as_str()),
            _ => None,
        }
    }
}
