use super::payloads::{
    BatteryReport, EmergencyEvent, LocationUpdate, NotificationEvent, PodMetrics, SystemStats,
    UavRecord,
};
use super::topic::Topic;
use crate::store::{Alert, FleetStore};
use crate::types::{ClientError, ServerMessage};
use std::sync::Arc;

/// Routes inbound events to their topic handler.
///
/// Each topic maps 1:1 to a handler that commits to the [`FleetStore`];
/// dispatch is synchronous with arrival order, one event at a time. A
/// failing handler is caught and logged without affecting the client or
/// other handlers, and unknown topics are dropped silently.
pub struct EventRouter {
    store: Arc<FleetStore>,
}

impl EventRouter {
    pub fn new(store: Arc<FleetStore>) -> Self {
        Self { store }
    }

    pub async fn route(&self, message: ServerMessage) {
        let Some(topic) = Topic::parse(&message.topic) else {
            tracing::debug!(topic = %message.topic, "dropping event for unknown topic");
            return;
        };

        if let Err(e) = self.dispatch(topic, message.data).await {
            tracing::error!(topic = topic.as_str(), error = %e, "event handler failed");
        }
    }

    async fn dispatch(&self, topic: Topic, data: serde_json::Value) -> Result<(), ClientError> {
        match topic {
            Topic::SystemStats => {
                let stats: SystemStats = serde_json::from_value(data)?;
                self.store.apply_system_stats(stats).await;
            }
            Topic::UavStatus => {
                let uav: UavRecord = serde_json::from_value(data)?;
                self.store.apply_uav_status(uav).await;
            }
            Topic::BatteryAlerts => {
                let report: BatteryReport = serde_json::from_value(data)?;
                self.store.apply_battery_report(report.clone()).await;
                if report.critical_battery > 0 {
                    let alert = Alert::critical(
                        "battery",
                        "Critical Battery Alert",
                        format!(
                            "{} UAV(s) have critical battery levels",
                            report.critical_battery
                        ),
                    );
                    self.store.push_alert(alert).await;
                }
            }
            Topic::FlightActivity => {
                // Opaque activity payload, forwarded as-is
                self.store.apply_flight_activity(data).await;
            }
            Topic::HibernatePod => {
                let pod: PodMetrics = serde_json::from_value(data)?;
                self.store.apply_pod_metrics(pod).await;
            }
            Topic::Notifications => {
                let event: NotificationEvent = serde_json::from_value(data)?;
                let mut alert = Alert::info("notification", event.title, event.message);
                if let Some(ts) = event.timestamp {
                    alert = alert.with_timestamp(ts);
                }
                self.store.push_alert(alert).await;
            }
            Topic::EmergencyAlerts => {
                let event: EmergencyEvent = serde_json::from_value(data)?;
                let mut alert = Alert::critical(
                    "emergency",
                    format!("Emergency: {}", event.alert_type),
                    event.description,
                )
                .with_uav(event.uav_rfid);
                if let Some(ts) = event.timestamp {
                    alert = alert.with_timestamp(ts);
                }
                self.store.push_alert(alert).await;
            }
            Topic::LocationUpdates => {
                let location: LocationUpdate = serde_json::from_value(data)?;
                self.store.apply_location(location).await;
            }
        }
        Ok(())
    }
}
