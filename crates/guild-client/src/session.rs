//! Bot session
//!
//! Wires one gateway, one REST client and one event hub together. Gateway
//! events and REST rate-limit signals are delivered through the same hub, so
//! a handler registered here sees both.

use crate::error::ClientResult;
use guild_common::ClientConfig;
use guild_core::{DispatchMode, Event, EventHub, EventPayload, EventRegistry, EventSink, HandlerId};
use guild_gateway::{Gateway, GatewayResult};
use guild_rest::{Method, RestClient, RestResult};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// A bot session
pub struct Session {
    config: ClientConfig,
    hub: Arc<EventHub>,
    gateway: Gateway,
    rest: RestClient,
}

impl Session {
    /// Session with default settings for `token`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> ClientResult<Self> {
        Self::from_config(ClientConfig::new(token))
    }

    /// Session configured from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or invalid.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Session with the standard event registry
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        Self::with_registry(config, Arc::new(EventRegistry::standard()))
    }

    /// Session decoding events through a custom registry
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_registry(config: ClientConfig, registry: Arc<EventRegistry>) -> ClientResult<Self> {
        let hub = EventHub::new_shared(DispatchMode::from_sync_events(config.gateway.sync_events));
        let sink: Arc<dyn EventSink> = hub.clone();

        let rest = RestClient::new(config.token.clone(), config.rest.clone(), Some(sink.clone()))?;
        let gateway = Gateway::new(config.gateway.clone(), config.token.clone(), registry, sink);

        tracing::debug!(
            gateway_url = %config.gateway.url,
            api_base = %config.rest.api_base,
            strategy = hub.strategy_name(),
            "Session created"
        );

        Ok(Self {
            config,
            hub,
            gateway,
            rest,
        })
    }

    /// Open the gateway connection
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already open or the handshake fails.
    pub async fn open(&self) -> GatewayResult<()> {
        self.gateway.open().await
    }

    /// Close the gateway connection and stop any reconnect in progress
    pub async fn close(&self) {
        self.gateway.close().await;
    }

    /// Register a handler for every event of shape `T`
    pub fn add_handler<T, F, Fut>(&self, handler: F) -> HandlerId
    where
        T: EventPayload,
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hub.handlers().add::<T, F, Fut>(handler)
    }

    /// Register a handler for the next event of shape `T` only
    pub fn add_handler_once<T, F, Fut>(&self, handler: F) -> HandlerId
    where
        T: EventPayload,
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hub.handlers().add_once::<T, F, Fut>(handler)
    }

    /// Register a handler for every event
    pub fn add_catch_all<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hub.handlers().add_catch_all(handler)
    }

    /// Remove a handler; returns `false` if it was not registered
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.hub.handlers().remove(id)
    }

    /// Issue a REST call through the shared executor
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails; see [`RestClient::execute`].
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> RestResult<Vec<u8>> {
        self.rest.request(method, url, body).await
    }

    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("gateway", &self.gateway)
            .field("rest", &self.rest)
            .field("strategy", &self.hub.strategy_name())
            .finish_non_exhaustive()
    }
}
