//! Typed inbound payloads.
//!
//! The backend pushes loosely-specified JSON; everything here carries
//! `#[serde(default)]` so missing fields default instead of failing the
//! whole event, and field names follow the backend's camelCase shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fleet-wide counters pushed on the `system-stats` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemStats {
    pub total_uavs: u32,
    pub active_flights: u32,
    pub battery_alerts: u32,
    pub maintenance_due: u32,
    pub active_emergencies: u32,
}

/// A single UAV record pushed on the `uav-status` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UavRecord {
    pub rfid: String,
    pub status: String,
    pub battery_level: f64,
    pub current_mission: Option<String>,
}

/// Aggregate battery counts pushed on the `battery-alerts` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatteryReport {
    pub critical_battery: u32,
    pub low_battery: u32,
    pub charging: u32,
    pub healthy: u32,
}

/// Hibernate-pod metrics pushed on the `hibernate-pod` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodMetrics {
    pub pod_id: String,
    pub status: String,
    pub charge_level: f64,
    pub occupancy: u32,
    pub capacity: u32,
}

/// Operator notification pushed on the `notifications` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationEvent {
    pub title: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Emergency event pushed on the `emergency-alerts` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyEvent {
    pub alert_type: String,
    pub description: String,
    pub uav_rfid: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Position fix pushed on the `location-updates` topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationUpdate {
    pub uav_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub timestamp: Option<DateTime<Utc>>,
}
