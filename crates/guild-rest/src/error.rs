//! REST error types

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A 429 that was not retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rate limited on {url}, retry after {retry_after:?}")]
pub struct RateLimitError {
    pub retry_after: Duration,
    pub url: String,
}

/// Machine-readable error body returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

/// A non-success response
#[derive(Debug, Clone)]
pub struct ApiError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw response body
    pub body: String,
    /// Parsed body, when it decodes as an API error message
    pub message: Option<ApiErrorMessage>,
}

impl ApiError {
    pub(crate) fn new(
        method: Method,
        url: &str,
        status: StatusCode,
        headers: HeaderMap,
        body: &[u8],
    ) -> Self {
        Self {
            method,
            url: url.to_string(),
            status,
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            message: serde_json::from_slice(body).ok(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(
                f,
                "HTTP {}, {}: {}",
                self.status, message.code, message.message
            ),
            None => write!(f, "HTTP {}, {}", self.status, self.body),
        }
    }
}

impl std::error::Error for ApiError {}

/// REST error type
#[derive(Debug, Error)]
pub enum RestError {
    /// The request could not be sent or the body not read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request body could not be encoded
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// 502 on every allowed attempt
    #[error("Exceeded max retries HTTP {status}, {body}")]
    RetriesExceeded { status: StatusCode, body: String },

    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    /// A 429 without a usable `Retry-After` header
    #[error("Invalid Retry-After header: {0:?}")]
    InvalidRetryAfter(String),

    /// 401 with a token that is not a bot token
    #[error("Unauthorized, token may not be a bot token: {0}")]
    Unauthorized(Box<ApiError>),

    #[error("API error: {0}")]
    Api(Box<ApiError>),

    /// The response body did not have the expected shape
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl RestError {
    /// HTTP status of the failed response, if there was one
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RetriesExceeded { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Unauthorized(error) | Self::Api(error) => Some(error.status),
            Self::Http(error) => error.status(),
            _ => None,
        }
    }
}

/// REST result type
pub type RestResult<T> = Result<T, RestError>;
