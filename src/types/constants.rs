/// Topic name strings (magic strings layer)
pub mod topics {
    pub const SYSTEM_STATS: &str = "system-stats";
    pub const UAV_STATUS: &str = "uav-status";
    pub const BATTERY_ALERTS: &str = "battery-alerts";
    pub const FLIGHT_ACTIVITY: &str = "flight-activity";
    pub const HIBERNATE_POD: &str = "hibernate-pod";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const EMERGENCY_ALERTS: &str = "emergency-alerts";
    pub const LOCATION_UPDATES: &str = "location-updates";
}

/// Outbound event asking the server to start pushing a topic
pub const SUBSCRIBE_EVENT: &str = "subscribe";

/// Default WebSocket handshake timeout (milliseconds)
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 10_000;

/// Default reconnection attempt limit before the client gives up
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Default base delay for exponential reconnect backoff (milliseconds)
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1_000;

/// Maximum number of alerts retained by the store (oldest dropped first)
pub const MAX_STORED_ALERTS: usize = 100;

/// Environment variables consulted by `ClientOptions::from_env`
pub const ENV_WS_URL: &str = "FLEET_WS_URL";
pub const ENV_WS_TOKEN: &str = "FLEET_WS_TOKEN";
pub const ENV_API_URL: &str = "FLEET_API_URL";
