//! Connects to a running backend and prints dashboard updates.
//!
//! ```sh
//! FLEET_WS_URL=ws://localhost:4000/realtime cargo run --example basic
//! ```

use fleet_realtime::{FleetStore, RealtimeClient};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("fleet_realtime=debug")
        .init();

    let store = Arc::new(FleetStore::new());
    let client = RealtimeClient::from_env(Arc::clone(&store))?;

    client.connect().await?;
    println!("connected: {}", client.is_connected().await);

    loop {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let state = store.snapshot().await;
        println!(
            "uavs={} flights={} alerts={} status={}",
            state.system_stats.total_uavs,
            state.system_stats.active_flights,
            state.alerts.len(),
            store.current_status().as_str(),
        );
    }
}
