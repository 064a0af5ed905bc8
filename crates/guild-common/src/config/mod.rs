//! Configuration structs

mod client_config;

pub use client_config::{
    ClientConfig, ConfigError, GatewayConfig, RestConfig, DEFAULT_API_URL, DEFAULT_GATEWAY_URL,
    DEFAULT_USER_AGENT,
};
