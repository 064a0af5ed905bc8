//! Guilded REST client
//!
//! A request executor that retries 502s, sleeps out or reports 429s and
//! classifies error responses, plus typed channel and message calls built on
//! top of it.

mod channels;
mod client;
pub mod endpoints;
pub mod error;

pub use client::RestClient;
pub use endpoints::Endpoints;
pub use error::{ApiError, ApiErrorMessage, RateLimitError, RestError, RestResult};
pub use reqwest::Method;
