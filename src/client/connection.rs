use crate::types::{error::Result, message::ClientMessage};
use crate::websocket::WsStream;
use futures::stream::SplitSink;
use futures::SinkExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

/// Owns the one active transport handle (write half) and the connection
/// state cell. No other code touches the sink directly.
pub struct ConnectionManager {
    ws_write: Arc<RwLock<Option<SplitSink<WsStream, Message>>>>,
    state: Arc<RwLock<ConnectionState>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            ws_write: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
        }
    }

    /// Sets the WebSocket write sink (called after successful connection)
    pub async fn set_writer(&self, writer: SplitSink<WsStream, Message>) {
        let mut ws = self.ws_write.write().await;
        *ws = Some(writer);
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, new_state: ConnectionState) {
        let mut state = self.state.write().await;
        *state = new_state;
    }

    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Connected
    }

    /// Sends a message through the WebSocket connection
    pub async fn send_message(&self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        let message = Message::Text(json);

        let mut ws_guard = self.ws_write.write().await;
        if let Some(ws) = ws_guard.as_mut() {
            ws.send(message).await?;
        }

        Ok(())
    }

    /// Closes the WebSocket connection gracefully and releases the
    /// handle. A close failure on an already-dead socket only needs the
    /// handle released, so errors are logged rather than propagated.
    pub async fn close(&self) {
        let mut ws_guard = self.ws_write.write().await;
        if let Some(ws) = ws_guard.as_mut() {
            if let Err(e) = ws.close().await {
                tracing::debug!(error = %e, "error closing WebSocket, releasing handle anyway");
            }
        }
        *ws_guard = None;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
