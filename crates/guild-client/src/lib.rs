//! # guild-client
//!
//! Bot-facing entry point. A [`Session`] owns the realtime gateway, the REST
//! client and the handler hub they both report to.
//!
//! ```no_run
//! use guild_client::Session;
//! use guild_core::events::ChatMessageCreated;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new("token")?;
//! session.add_handler(|event: Arc<ChatMessageCreated>| async move {
//!     println!("{}", event.message.content);
//! });
//! session.open().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::{ClientError, ClientResult};
pub use session::Session;

pub use guild_common::{ClientConfig, GatewayConfig, RestConfig};
pub use guild_core::{Event, EventKind, HandlerId};
pub use guild_gateway::{GatewayError, GatewayResult};
pub use guild_rest::{Method, RestClient, RestError, RestResult};
