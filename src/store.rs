//! Dashboard state store.
//!
//! The router's topic handlers commit inbound events here; the client
//! reports connection-status transitions here. Constructed once at
//! application bootstrap and shared by `Arc` — there is no hidden
//! global.

use crate::messaging::payloads::{
    BatteryReport, LocationUpdate, PodMetrics, SystemStats, UavRecord,
};
use crate::types::constants::MAX_STORED_ALERTS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

/// Connection lifecycle as observed by store subscribers.
///
/// `ReconnectionFailed` is the one terminal, user-visible failure:
/// reported when the reconnect-attempt limit is exhausted, never thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Errored,
    ReconnectionFailed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Errored => "errored",
            Self::ReconnectionFailed => "max_reconnect_attempts_reached",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    Info,
    Critical,
}

/// A user-facing alert synthesized from an inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uav_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
}

impl Alert {
    pub fn new(
        category: &str,
        kind: AlertKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{category}-{}", now.timestamp_millis()),
            kind,
            title: title.into(),
            message: message.into(),
            uav_id: None,
            timestamp: now,
            acknowledged: false,
        }
    }

    pub fn info(category: &str, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, AlertKind::Info, title, message)
    }

    pub fn critical(category: &str, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, AlertKind::Critical, title, message)
    }

    pub fn with_uav(mut self, uav_id: impl Into<String>) -> Self {
        self.uav_id = Some(uav_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Snapshot of everything the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub system_stats: SystemStats,
    pub uavs: HashMap<String, UavRecord>,
    pub battery: BatteryReport,
    pub flight_activity: Option<serde_json::Value>,
    pub pods: HashMap<String, PodMetrics>,
    pub alerts: Vec<Alert>,
    pub locations: HashMap<String, LocationUpdate>,
}

pub struct FleetStore {
    state: RwLock<DashboardState>,
    status_tx: watch::Sender<ConnectionStatus>,
}

impl FleetStore {
    pub fn new() -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            state: RwLock::new(DashboardState::default()),
            status_tx,
        }
    }

    /// Subscribes to connection-status transitions.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        // send_replace so transitions are recorded even with no subscribers
        let previous = self.status_tx.send_replace(status);
        if previous != status {
            tracing::info!(
                previous = previous.as_str(),
                current = status.as_str(),
                "connection status"
            );
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn apply_system_stats(&self, stats: SystemStats) {
        self.state.write().await.system_stats = stats;
    }

    pub async fn apply_uav_status(&self, uav: UavRecord) {
        self.state.write().await.uavs.insert(uav.rfid.clone(), uav);
    }

    pub async fn apply_battery_report(&self, report: BatteryReport) {
        self.state.write().await.battery = report;
    }

    pub async fn apply_flight_activity(&self, activity: serde_json::Value) {
        self.state.write().await.flight_activity = Some(activity);
    }

    pub async fn apply_pod_metrics(&self, pod: PodMetrics) {
        self.state
            .write()
            .await
            .pods
            .insert(pod.pod_id.clone(), pod);
    }

    pub async fn apply_location(&self, location: LocationUpdate) {
        self.state
            .write()
            .await
            .locations
            .insert(location.uav_id.clone(), location);
    }

    pub async fn push_alert(&self, alert: Alert) {
        let mut state = self.state.write().await;
        state.alerts.push(alert);
        if state.alerts.len() > MAX_STORED_ALERTS {
            let excess = state.alerts.len() - MAX_STORED_ALERTS;
            state.alerts.drain(..excess);
        }
    }

    /// Marks an alert acknowledged; unknown ids are ignored.
    pub async fn acknowledge_alert(&self, id: &str) {
        let mut state = self.state.write().await;
        if let Some(alert) = state.alerts.iter_mut().find(|a| a.id == id) {
            alert.acknowledged = true;
        }
    }
}

impl Default for FleetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_watch_notifies() {
        let store = FleetStore::new();
        let mut rx = store.status();
        assert_eq!(*rx.borrow(), ConnectionStatus::Disconnected);

        store.set_status(ConnectionStatus::Connecting);
        store.set_status(ConnectionStatus::Connected);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_uav_and_location_keyed_by_id() {
        let store = FleetStore::new();
        store
            .apply_uav_status(UavRecord {
                rfid: "UAV-1".into(),
                status: "airborne".into(),
                battery_level: 71.0,
                current_mission: None,
            })
            .await;
        store
            .apply_location(LocationUpdate {
                uav_id: "UAV-1".into(),
                latitude: 52.1,
                longitude: 4.3,
                altitude: 80.0,
                timestamp: None,
            })
            .await;

        let state = store.snapshot().await;
        assert_eq!(state.uavs["UAV-1"].status, "airborne");
        assert_eq!(state.locations["UAV-1"].altitude, 80.0);
    }

    #[tokio::test]
    async fn test_alert_list_capped() {
        let store = FleetStore::new();
        for i in 0..(MAX_STORED_ALERTS + 5) {
            store
                .push_alert(Alert::info("test", format!("alert {i}"), "msg"))
                .await;
        }
        let state = store.snapshot().await;
        assert_eq!(state.alerts.len(), MAX_STORED_ALERTS);
        assert_eq!(state.alerts.last().unwrap().title, "alert 104");
    }

    #[tokio::test]
    async fn test_acknowledge_alert() {
        let store = FleetStore::new();
        let alert = Alert::critical("emergency", "Crash", "UAV down");
        let id = alert.id.clone();
        store.push_alert(alert).await;

        store.acknowledge_alert(&id).await;
        store.acknowledge_alert("no-such-id").await;

        let state = store.snapshot().await;
        assert!(state.alerts[0].acknowledged);
    }

    #[test]
    fn test_alert_id_shape() {
        let alert = Alert::info("battery", "t", "m");
        let (category, epoch) = alert.id.split_once('-').unwrap();
        assert_eq!(category, "battery");
        assert!(epoch.parse::<i64>().is_ok());
    }

    #[test]
    fn test_alert_serializes_type_tag() {
        let alert = Alert::critical("emergency", "t", "m").with_uav("UAV-9");
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains(r#""type":"CRITICAL""#));
        assert!(json.contains(r#""uavId":"UAV-9""#));
        assert!(json.contains(r#""acknowledged":false"#));
    }
}
