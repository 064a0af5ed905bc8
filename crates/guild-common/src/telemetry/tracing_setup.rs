//! Tracing and logging setup
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to the
//! bot's own crates while the websocket and HTTP stacks are held at `warn`.

use tracing::Level;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Selects JSON output when set to `json`
pub const LOG_FORMAT_VAR: &str = "GUILDED_LOG_FORMAT";

/// Transport crates that log every frame at debug level
const QUIET_DEPENDENCIES: &[&str] = &[
    "tungstenite=warn",
    "tokio_tungstenite=warn",
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "rustls=warn",
];

/// Subscriber options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    pub json: bool,
    /// Log span open and close
    pub span_events: bool,
    pub file_line: bool,
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: false,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    /// Debug logging with span events, for local bot development
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            file_line: true,
            thread_names: true,
            ..Self::default()
        }
    }

    /// JSON logging at info level
    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            ..Self::default()
        }
    }

    /// Default options, switched to JSON by `GUILDED_LOG_FORMAT=json`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LOG_FORMAT_VAR) {
            Some(format) if format.trim().eq_ignore_ascii_case("json") => Self::production(),
            _ => Self::default(),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }

        QUIET_DEPENDENCIES
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::new(self.level.to_string()), |filter, directive| {
                filter.add_directive(directive)
            })
    }
}

/// Initialize tracing from the environment
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::from_env())
}

/// Initialize tracing with explicit options
///
/// Never panics; a second call returns `AlreadyInitialized`.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let json = config.json.then(|| {
        fmt::layer()
            .json()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_thread_names(config.thread_names)
            .with_span_events(config.span_events())
    });
    let text = (!config.json).then(|| {
        fmt::layer()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_thread_names(config.thread_names)
            .with_span_events(config.span_events())
    });

    tracing_subscriber::registry()
        .with(config.filter())
        .with(json)
        .with(text)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
