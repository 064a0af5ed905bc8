//! Client configuration structs
//!
//! Loads configuration from environment variables, with defaults matching
//! the public Guilded endpoints.

use std::env;
use std::time::Duration;

/// Default realtime gateway URL
pub const DEFAULT_GATEWAY_URL: &str = "wss://api.guilded.gg/v1/websocket";

/// Default REST API base URL
pub const DEFAULT_API_URL: &str = "https://www.guilded.gg/api/v1/";

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("GuildedBot (guild-rs, v", env!("CARGO_PKG_VERSION"), ")");

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bot access token, sent as `Authorization: Bearer <token>`
    pub token: String,
    pub gateway: GatewayConfig,
    pub rest: RestConfig,
}

/// Realtime gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub url: String,
    /// Reconnect automatically after heartbeat or read failures
    pub reconnect_on_error: bool,
    /// Await handlers in order on the read loop instead of spawning them
    pub sync_events: bool,
    /// Wait between sending the close frame and dropping the socket
    pub close_grace: Duration,
    /// Bound on the websocket upgrade plus the hello frame
    pub handshake_timeout: Duration,
    /// Base unit of the reconnect backoff
    pub backoff_unit: Duration,
    /// Backoff ceiling, in `backoff_unit`s
    pub backoff_max_units: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            reconnect_on_error: true,
            sync_events: false,
            close_grace: Duration::from_secs(1),
            handshake_timeout: Duration::from_secs(45),
            backoff_unit: Duration::from_secs(1),
            backoff_max_units: 600,
        }
    }
}

/// REST executor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// Base URL, with trailing slash
    pub api_base: String,
    /// Extra attempts allowed after a 502
    pub max_retries: u32,
    /// Sleep out 429s instead of returning them
    pub retry_on_rate_limit: bool,
    pub timeout: Duration,
    pub user_agent: String,
    /// Length of one `Retry-After` unit (the header counts seconds)
    pub retry_after_unit: Duration,
    /// Prefix that marks a token as a bot credential
    pub bot_token_prefix: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_URL.to_string(),
            max_retries: 3,
            retry_on_rate_limit: true,
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_after_unit: Duration::from_secs(1),
            bot_token_prefix: "Bot ".to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration for `token`
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            gateway: GatewayConfig::default(),
            rest: RestConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    /// Returns an error if `GUILDED_TOKEN` is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("GUILDED_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("GUILDED_TOKEN"))?;

        let gateway_defaults = GatewayConfig::default();
        let rest_defaults = RestConfig::default();

        Ok(Self {
            token,
            gateway: GatewayConfig {
                url: lookup("GUILDED_GATEWAY_URL").unwrap_or(gateway_defaults.url),
                reconnect_on_error: parse_bool(&lookup, "GUILDED_RECONNECT_ON_ERROR")?
                    .unwrap_or(gateway_defaults.reconnect_on_error),
                sync_events: parse_bool(&lookup, "GUILDED_SYNC_EVENTS")?
                    .unwrap_or(gateway_defaults.sync_events),
                ..gateway_defaults
            },
            rest: RestConfig {
                api_base: lookup("GUILDED_API_URL")
                    .map(with_trailing_slash)
                    .unwrap_or(rest_defaults.api_base),
                retry_on_rate_limit: parse_bool(&lookup, "GUILDED_RETRY_ON_RATE_LIMIT")?
                    .unwrap_or(rest_defaults.retry_on_rate_limit),
                max_retries: parse(&lookup, "GUILDED_MAX_REST_RETRIES")?
                    .unwrap_or(rest_defaults.max_retries),
                timeout: parse(&lookup, "GUILDED_REST_TIMEOUT_SECS")?
                    .map_or(rest_defaults.timeout, Duration::from_secs),
                user_agent: lookup("GUILDED_USER_AGENT").unwrap_or(rest_defaults.user_agent),
                ..rest_defaults
            },
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
        })
        .transpose()
}

fn parse_bool<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(key, raw)),
        })
        .transpose()
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
