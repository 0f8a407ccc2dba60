use super::{ClientBuilder, ClientOptions, ClientState, ConnectionManager, ConnectionState};
use crate::messaging::{EventRouter, Topic};
use crate::store::{ConnectionStatus, FleetStore};
use crate::types::{ClientMessage, Result, ServerMessage, ENV_WS_URL};
use crate::websocket::WebSocketFactory;
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::sleep;
use url::Url;

/// Realtime client for the fleet dashboard.
///
/// Owns a single persistent WebSocket connection to the backend push
/// endpoint, re-subscribes the fixed topic set on every successful
/// (re)connection, fans inbound events out to the injected
/// [`FleetStore`], and reconnects with bounded exponential backoff. This
/// is a fire-and-forget background client: connection and handler
/// failures are reported through the store's connection status, never
/// thrown at callers.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use fleet_realtime::{ClientOptions, FleetStore, RealtimeClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(FleetStore::new());
/// let client = RealtimeClient::new(
///     "ws://localhost:4000/realtime",
///     ClientOptions::default(),
///     Arc::clone(&store),
/// )?;
///
/// client.connect().await?;
/// // Inbound events now update the store...
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) endpoint: String,
    pub(crate) options: ClientOptions,
    pub(crate) store: Arc<FleetStore>,

    // Connection manager
    pub(crate) connection: Arc<ConnectionManager>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,
}

impl RealtimeClient {
    /// Creates a new client. No connection is established until
    /// [`connect()`](Self::connect) is called.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`](crate::types::ClientError::UrlParse)
    /// for a malformed endpoint, or
    /// [`ClientError::Config`](crate::types::ClientError::Config) for
    /// invalid options.
    pub fn new(
        endpoint: impl Into<String>,
        options: ClientOptions,
        store: Arc<FleetStore>,
    ) -> Result<Self> {
        ClientBuilder::new(endpoint, options, store).map(|builder| builder.build())
    }

    /// Creates a client from `FLEET_WS_URL` / `FLEET_WS_TOKEN`.
    pub fn from_env(store: Arc<FleetStore>) -> Result<Self> {
        let endpoint = std::env::var(ENV_WS_URL).map_err(|_| {
            crate::types::ClientError::Config(format!("{ENV_WS_URL} is not set"))
        })?;
        Self::new(endpoint, ClientOptions::from_env(), store)
    }

    /// The store this client reports into.
    pub fn store(&self) -> &Arc<FleetStore> {
        &self.store
    }

    /// Set connection state, notify watchers, and report to the store
    async fn set_state(&self, new_state: ConnectionState) {
        self.connection.set_state(new_state).await;

        let state = self.state.read().await;
        state.notify_state_change(new_state, state.was_manual_disconnect);
        drop(state);

        self.store.set_status(match new_state {
            ConnectionState::Disconnected => ConnectionStatus::Disconnected,
            ConnectionState::Connecting => ConnectionStatus::Connecting,
            ConnectionState::Connected => ConnectionStatus::Connected,
            ConnectionState::Errored => ConnectionStatus::Errored,
        });
    }

    /// Establishes the WebSocket connection.
    ///
    /// Idempotent: a no-op while already connecting or connected. On
    /// success the reconnect counter resets, the read task starts, and a
    /// `subscribe` request is sent for every topic in [`Topic::ALL`]. On
    /// failure the state moves to errored and the watcher task drives
    /// the reconnection algorithm.
    pub async fn connect(&self) -> Result<()> {
        {
            let state = self.connection.state().await;
            if state == ConnectionState::Connected || state == ConnectionState::Connecting {
                return Ok(());
            }
        }
        self.set_state(ConnectionState::Connecting).await;

        let url = self.build_endpoint_url()?;
        tracing::info!(endpoint = %self.endpoint, "connecting");

        let ws_stream = match WebSocketFactory::create(&url, self.options.handshake_timeout).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "connection failed");
                self.set_state(ConnectionState::Errored).await;
                return Err(e);
            }
        };
        let (write_half, mut read_half) = ws_stream.split();

        self.connection.set_writer(write_half).await;

        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = false;
            state.gave_up = false;
            state.backoff.reset();
        }
        // Transition to connected before the read task starts: a close
        // that arrives right after the handshake must be observed as a
        // disconnect, never overwritten by a stale connected state.
        self.set_state(ConnectionState::Connected).await;
        tracing::info!("connected");

        let router = EventRouter::new(Arc::clone(&self.store));

        // Spawn read task: dispatches inbound events in arrival order,
        // one at a time.
        let self_cloned = self.clone();
        {
            let mut state = self.state.write().await;
            state.task_manager.spawn(async move {
                use tokio_tungstenite::tungstenite::Message;

                tracing::debug!("read task started");
                loop {
                    match read_half.next().await {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<ServerMessage>(&text) {
                                Ok(event) => router.route(event).await,
                                Err(e) => {
                                    tracing::warn!(error = %e, raw = %text, "failed to parse inbound message");
                                }
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            match frame {
                                Some(close_frame) => tracing::warn!(
                                    code = %close_frame.code,
                                    reason = %close_frame.reason,
                                    "server closed connection"
                                ),
                                None => {
                                    tracing::warn!("server closed connection without close frame")
                                }
                            }
                            self_cloned.handle_remote_close(ConnectionState::Disconnected).await;
                            break;
                        }
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                            // tungstenite answers pings itself on the next poll
                        }
                        Some(Ok(other)) => {
                            tracing::debug!(?other, "ignoring unexpected frame");
                        }
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "WebSocket read error");
                            self_cloned.handle_remote_close(ConnectionState::Errored).await;
                            break;
                        }
                        None => {
                            tracing::warn!("WebSocket stream ended");
                            self_cloned.handle_remote_close(ConnectionState::Disconnected).await;
                            break;
                        }
                    }
                }
                tracing::debug!("read task finished");
            });
        }

        self.subscribe_all().await;
        Ok(())
    }

    /// Manual, intentional close. Never triggers reconnection; resets
    /// the reconnect counter and releases the transport handle.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = true;
            state.task_manager.abort_all();
            state.backoff.reset();
            state.gave_up = false;
        }

        self.connection.close().await;
        self.set_state(ConnectionState::Disconnected).await;
        tracing::info!("disconnected");
    }

    /// Disconnect then connect, resetting the attempt counter.
    pub async fn reconnect(&self) -> Result<()> {
        self.disconnect().await;
        {
            let mut state = self.state.write().await;
            state.was_manual_disconnect = false;
        }
        self.connect().await
    }

    /// Current boolean connection state; never fails.
    pub async fn is_connected(&self) -> bool {
        self.connection.is_connected().await
    }

    /// Sends a message if and only if currently connected; otherwise the
    /// message is dropped and logged. Never errors, never queues.
    pub async fn emit(&self, event: &str, data: serde_json::Value) {
        self.send(ClientMessage::new(event, data)).await;
    }

    /// Reconnect attempts since the last successful connect.
    pub async fn reconnect_attempts(&self) -> u32 {
        self.state.read().await.backoff.attempts()
    }

    async fn send(&self, message: ClientMessage) {
        if !self.connection.is_connected().await {
            tracing::warn!(event = %message.event, "not connected, dropping outbound message");
            return;
        }
        if let Err(e) = self.connection.send_message(&message).await {
            tracing::error!(event = %message.event, error = %e, "failed to send message");
        }
    }

    /// Issues a subscribe request for the fixed topic set.
    async fn subscribe_all(&self) {
        for topic in Topic::ALL {
            self.send(ClientMessage::subscribe(topic.as_str())).await;
        }
    }

    /// Transition used by the read task when the server side goes away.
    async fn handle_remote_close(&self, state: ConnectionState) {
        self.connection.close().await;
        self.set_state(state).await;
    }

    /// Reconnection driver, invoked by the state-watcher task on any
    /// non-manual disconnect. Delays follow the backoff schedule; when
    /// the attempt limit is exhausted the terminal failure is reported
    /// to the store and the loop latches off until the next successful
    /// connect.
    pub(crate) async fn try_reconnect(&self) {
        {
            let mut state = self.state.write().await;
            if state.was_manual_disconnect || state.reconnecting || state.gave_up {
                return;
            }
            state.reconnecting = true;
        }

        loop {
            {
                let conn = self.connection.state().await;
                if conn == ConnectionState::Connected || conn == ConnectionState::Connecting {
                    break;
                }
            }

            let delay = {
                let mut state = self.state.write().await;
                match state.backoff.next_delay() {
                    Some(delay) => delay,
                    None => {
                        state.gave_up = true;
                        drop(state);
                        tracing::error!("max reconnect attempts reached, giving up");
                        self.store.set_status(ConnectionStatus::ReconnectionFailed);
                        break;
                    }
                }
            };

            let attempt = self.state.read().await.backoff.attempts();
            tracing::info!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "scheduling reconnect"
            );
            sleep(delay).await;

            // A manual disconnect during the wait cancels the episode
            if self.state.read().await.was_manual_disconnect {
                break;
            }

            match self.connect().await {
                Ok(_) => {
                    tracing::info!("reconnected successfully");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "reconnection attempt failed");
                }
            }
        }

        self.state.write().await.reconnecting = false;
    }

    /// Build the WebSocket endpoint URL with query parameters
    fn build_endpoint_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.endpoint)?;

        if let Some(token) = &self.options.auth_token {
            url.query_pairs_mut().append_pair("token", token);
        }

        Ok(url.to_string())
    }
}
