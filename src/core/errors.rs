use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Code stored in an [`ApiError`] whose body was not a `{code, msg}` envelope.
pub const INVALID_API_CODE: i64 = 0;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Invalid error response: {0}")]
    InvalidEnvelope(ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),
}

impl ExchangeError {
    /// Exchange error code for `Api` and `InvalidEnvelope` errors
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api(e) | Self::InvalidEnvelope(e) => Some(e.code),
            _ => None,
        }
    }

    /// The server rejected the call because of request weight or order rate limits
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Api(e) | Self::InvalidEnvelope(e) => e.is_rate_limited(),
            _ => false,
        }
    }

    /// True for both explicit cancellation and an expired deadline
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Wire shape of an error response: `{"code": -1121, "msg": "Invalid symbol."}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

impl ApiErrorEnvelope {
    pub fn is_valid(&self) -> bool {
        self.code != 0 || !self.msg.is_empty()
    }
}

/// Error returned by the exchange for an HTTP status of 400 or above
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: i64,
    pub message: String,
    pub raw: Vec<u8>,
}

impl ApiError {
    /// Classify an error response body.
    ///
    /// A body that decodes into a non-empty envelope becomes `ExchangeError::Api`;
    /// anything else keeps the raw bytes under `ExchangeError::InvalidEnvelope`.
    pub fn from_response(status: u16, body: &[u8]) -> ExchangeError {
        match serde_json::from_slice::<ApiErrorEnvelope>(body) {
            Ok(envelope) if envelope.is_valid() => ExchangeError::Api(Self {
                status,
                code: envelope.code,
                message: envelope.msg,
                raw: body.to_vec(),
            }),
            _ => ExchangeError::InvalidEnvelope(Self {
                status,
                code: INVALID_API_CODE,
                message: String::from_utf8_lossy(body).into_owned(),
                raw: body.to_vec(),
            }),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.code != INVALID_API_CODE
    }

    pub fn is_rate_limited(&self) -> bool {
        // 429: request weight exceeded, 418: IP auto-banned, -1003: too many requests
        matches!(self.status, 418 | 429) || self.code == -1003
    }

    pub fn envelope(&self) -> ApiErrorEnvelope {
        ApiErrorEnvelope {
            code: self.code,
            msg: self.message.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<APIError> status={}, code={}, msg={}",
            self.status, self.code, self.message
        )
    }
}
