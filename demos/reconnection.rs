//! Watches connection-status transitions while the backend is stopped
//! and restarted, to observe the backoff schedule and the terminal
//! max-attempts report.

use fleet_realtime::{ClientOptions, FleetStore, RealtimeClient};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("fleet_realtime=debug")
        .init();

    let endpoint =
        std::env::var("FLEET_WS_URL").unwrap_or_else(|_| "ws://localhost:4000/realtime".into());

    let store = Arc::new(FleetStore::new());
    let options = ClientOptions {
        reconnect_base_delay: Duration::from_millis(500),
        ..Default::default()
    };
    let client = RealtimeClient::new(endpoint, options, Arc::clone(&store))?;

    if let Err(e) = client.connect().await {
        eprintln!("initial connect failed: {e}");
    }

    let mut status = store.status();
    while status.changed().await.is_ok() {
        let current = *status.borrow_and_update();
        println!(
            "status={} attempts={}",
            current.as_str(),
            client.reconnect_attempts().await
        );
    }
    Ok(())
}
