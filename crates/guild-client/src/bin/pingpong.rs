//! Ping-pong bot
//!
//! Replies "pong" to every "ping" chat message.
//!
//! Run with:
//! ```bash
//! GUILDED_TOKEN=... cargo run -p guild-client --bin pingpong
//! ```

use anyhow::Context;
use guild_client::{ClientConfig, Session};
use guild_common::try_init_tracing;
use guild_core::events::{ChatMessageCreated, Connect, Disconnect};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Bot failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    info!(
        gateway_url = %config.gateway.url,
        sync_events = config.gateway.sync_events,
        "Configuration loaded"
    );

    let session = Session::from_config(config)?;

    session.add_handler(|_: Arc<Connect>| async {
        info!("Connected");
    });
    session.add_handler(|_: Arc<Disconnect>| async {
        info!("Disconnected");
    });

    let rest = session.rest().clone();
    session.add_handler(move |event: Arc<ChatMessageCreated>| {
        let rest = rest.clone();
        async move {
            if event.message.content != "ping" {
                return;
            }
            let channel_id = &event.message.channel_id;
            match rest.channel_message_create(channel_id, "pong").await {
                Ok(reply) => info!(channel_id = %channel_id, message_id = %reply.id, "Replied"),
                Err(e) => error!(channel_id = %channel_id, error = %e, "Failed to reply"),
            }
        }
    });

    session.open().await.context("Failed to open gateway")?;
    info!("Bot is running, press Ctrl-C to exit");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down");
    session.close().await;

    Ok(())
}
