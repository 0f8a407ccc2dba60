//! # Fleet Realtime
//!
//! Realtime client and async-operation controller for a UAV
//! fleet-management dashboard.
//!
//! Two independent pieces:
//!
//! - [`RealtimeClient`] — owns one persistent WebSocket connection to
//!   the backend push endpoint, subscribes a fixed set of data topics,
//!   fans inbound events out into a shared [`FleetStore`], and
//!   reconnects with bounded exponential backoff.
//! - [`AsyncOperation`] — wraps an arbitrary async function with
//!   timeout, retry-with-backoff, cooperative cancellation, and
//!   observable `{data, loading, error, last_updated}` state.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fleet_realtime::{ClientOptions, FleetStore, RealtimeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FleetStore::new());
//!     let client = RealtimeClient::new(
//!         "ws://localhost:4000/realtime",
//!         ClientOptions::default(),
//!         Arc::clone(&store),
//!     )?;
//!
//!     client.connect().await?;
//!
//!     let mut status = store.status();
//!     while status.changed().await.is_ok() {
//!         println!("connection: {}", status.borrow().as_str());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod ops;
pub mod store;
pub mod types;
pub mod websocket;

pub use client::{ClientBuilder, ClientOptions, RealtimeClient};
pub use infrastructure::ApiClient;
pub use messaging::{EventRouter, Topic};
pub use ops::{AsyncOperation, ErrorKind, OpError, OperationOptions, OperationState, RetryPolicy};
pub use store::{Alert, AlertKind, ConnectionStatus, DashboardState, FleetStore};
pub use types::{ClientError, ClientMessage, ServerMessage};
