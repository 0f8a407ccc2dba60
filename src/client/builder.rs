use super::{ClientState, ConnectionManager, ConnectionState, RealtimeClient};
use crate::infrastructure::Backoff;
use crate::store::FleetStore;
use crate::types::{
    ClientError, Result, DEFAULT_HANDSHAKE_TIMEOUT_MS, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_BASE_DELAY_MS, ENV_WS_TOKEN,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use url::Url;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Bearer token appended to the endpoint as a `token` query parameter
    pub auth_token: Option<String>,
    pub handshake_timeout: Duration,
    pub max_reconnect_attempts: u32,
    pub reconnect_base_delay: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auth_token: None,
            handshake_timeout: Duration::from_millis(DEFAULT_HANDSHAKE_TIMEOUT_MS),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_base_delay: Duration::from_millis(DEFAULT_RECONNECT_BASE_DELAY_MS),
        }
    }
}

impl ClientOptions {
    /// Default options with the auth token taken from `FLEET_WS_TOKEN`.
    pub fn from_env() -> Self {
        Self {
            auth_token: std::env::var(ENV_WS_TOKEN).ok(),
            ..Self::default()
        }
    }
}

/// Builder for RealtimeClient that handles initialization
pub struct ClientBuilder {
    endpoint: String,
    options: ClientOptions,
    store: Arc<FleetStore>,
}

impl ClientBuilder {
    /// Create a new builder, validating the endpoint URL up front
    pub fn new(
        endpoint: impl Into<String>,
        options: ClientOptions,
        store: Arc<FleetStore>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)?;

        if options.max_reconnect_attempts == 0 {
            return Err(ClientError::Config(
                "max_reconnect_attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            options,
            store,
        })
    }

    /// Build the client and spawn the reconnection watcher task
    pub fn build(self) -> RealtimeClient {
        let backoff = Backoff::new(
            self.options.max_reconnect_attempts,
            self.options.reconnect_base_delay,
        );
        let mut client_state = ClientState::new(backoff);

        let (state_tx, state_rx) = watch::channel((ConnectionState::Disconnected, false));
        client_state.state_change_tx = Some(state_tx);

        let client = RealtimeClient {
            endpoint: self.endpoint,
            options: self.options,
            store: self.store,
            connection: Arc::new(ConnectionManager::new()),
            state: Arc::new(RwLock::new(client_state)),
        };

        // Spawn reconnection watcher task
        let client_for_watcher = client.clone();
        tokio::spawn(async move {
            let mut rx = state_rx;

            while rx.changed().await.is_ok() {
                let (state, was_manual) = *rx.borrow_and_update();

                // Reconnect on any non-manual disconnect or connection error
                if matches!(
                    state,
                    ConnectionState::Disconnected | ConnectionState::Errored
                ) && !was_manual
                {
                    tracing::info!("state watcher detected disconnect, attempting reconnection");
                    client_for_watcher.try_reconnect().await;
                }
            }
            tracing::debug!("reconnection watcher task finished");
        });

        client
    }
}
