//! REST request executor
//!
//! Every call goes through [`RestClient::execute`], which classifies the
//! response:
//!
//! - 200, 201 and 204 return the body
//! - 502 is reissued until `max_retries` extra attempts have been spent
//! - 429 either sleeps out `Retry-After` and reissues the same attempt, or
//!   fails with [`RateLimitError`] when automatic retry is off
//! - 401 with a token lacking the bot prefix is [`RestError::Unauthorized`]
//! - anything else is [`RestError::Api`]

use crate::endpoints::Endpoints;
use crate::error::{ApiError, RateLimitError, RestError, RestResult};
use guild_common::RestConfig;
use guild_core::events::RateLimit;
use guild_core::{Event, EventSink};
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// HTTP client for the bot API
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestInner>,
}

struct RestInner {
    http: reqwest::Client,
    token: String,
    config: RestConfig,
    endpoints: Endpoints,
    events: Option<Arc<dyn EventSink>>,
}

impl RestClient {
    /// Create a client
    ///
    /// When `events` is set, every 429 that is slept out is reported on it as
    /// a `RateLimit` event before the sleep.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        token: impl Into<String>,
        config: RestConfig,
        events: Option<Arc<dyn EventSink>>,
    ) -> RestResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestInner {
                http,
                token: token.into(),
                endpoints: Endpoints::new(config.api_base.clone()),
                config,
                events,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    /// Send `body` encoded as JSON and return the raw response body
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be encoded or the request fails.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> RestResult<Vec<u8>> {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(RestError::Serialize)?;
        self.execute(method, url, body).await
    }

    /// Send a JSON request and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not
    /// decode as `T`.
    pub async fn request_json<T, B>(&self, method: Method, url: &str, body: Option<&B>) -> RestResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.request(method, url, body).await?;
        serde_json::from_slice(&bytes).map_err(RestError::Decode)
    }

    /// Execute a request with an already encoded body
    ///
    /// # Errors
    ///
    /// See the module documentation for how responses are classified.
    pub async fn execute(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> RestResult<Vec<u8>> {
        let inner = &self.inner;
        let mut attempt: u32 = 0;

        loop {
            tracing::debug!(method = %method, url = %url, attempt, "API request");

            let mut builder = inner
                .http
                .request(method.clone(), url)
                .header(USER_AGENT, inner.config.user_agent.as_str());
            if !inner.token.is_empty() {
                builder = builder.header(AUTHORIZATION, format!("Bearer {}", inner.token));
            }
            if let Some(body) = &body {
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response.bytes().await?;

            tracing::debug!(method = %method, url = %url, status = %status, "API response");

            match status.as_u16() {
                200 | 201 | 204 => {
                    return Ok(bytes.to_vec());
                }
                502 => {
                    if attempt < inner.config.max_retries {
                        attempt += 1;
                        tracing::info!(
                            url = %url,
                            attempt,
                            max_retries = inner.config.max_retries,
                            "Bad gateway, retrying"
                        );
                        continue;
                    }
                    return Err(RestError::RetriesExceeded {
                        status,
                        body: String::from_utf8_lossy(&bytes).into_owned(),
                    });
                }
                429 => {
                    let retry_after = retry_after_units(&headers)?;
                    let wait = inner.config.retry_after_unit.saturating_mul(retry_after);

                    if !inner.config.retry_on_rate_limit {
                        return Err(RateLimitError {
                            retry_after: wait,
                            url: url.to_string(),
                        }
                        .into());
                    }

                    tracing::info!(url = %url, retry_after = ?wait, "Rate limited, waiting before retry");
                    if let Some(events) = &inner.events {
                        events.emit(Event::from_payload(RateLimit::new(wait, url))).await;
                    }
                    tokio::time::sleep(wait).await;
                }
                401 if !inner.token.starts_with(inner.config.bot_token_prefix.as_str()) => {
                    tracing::warn!(url = %url, "Unauthorized, token is not a bot token");
                    return Err(RestError::Unauthorized(Box::new(ApiError::new(
                        method, url, status, headers, &bytes,
                    ))));
                }
                _ => {
                    return Err(RestError::Api(Box::new(ApiError::new(
                        method, url, status, headers, &bytes,
                    ))));
                }
            }
        }
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("api_base", &self.inner.config.api_base)
            .field("max_retries", &self.inner.config.max_retries)
            .field("retry_on_rate_limit", &self.inner.config.retry_on_rate_limit)
            .field("events", &self.inner.events.is_some())
            .finish_non_exhaustive()
    }
}

/// `Retry-After` as a whole number of units
fn retry_after_units(headers: &HeaderMap) -> RestResult<u32> {
    let raw = headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim();

    raw.parse::<u32>()
        .map_err(|_| RestError::InvalidRetryAfter(raw.to_string()))
}
