use crate::types::{ClientError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections with a bounded handshake timeout.
pub struct WebSocketFactory;

impl WebSocketFactory {
    pub async fn create(url: &str, handshake_timeout: Duration) -> Result<WsStream> {
        tracing::debug!(%url, "opening WebSocket connection");
        match tokio::time::timeout(handshake_timeout, connect_async(url)).await {
            Ok(Ok((stream, _response))) => Ok(stream),
            Ok(Err(e)) => Err(ClientError::WebSocket(e)),
            Err(_) => Err(ClientError::Timeout),
        }
    }
}
