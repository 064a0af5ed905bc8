//! Session error type

use guild_common::ConfigError;
use guild_gateway::GatewayError;
use guild_rest::RestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("REST error: {0}")]
    Rest(#[from] RestError),
}

pub type ClientResult<T> = Result<T, ClientError>;
