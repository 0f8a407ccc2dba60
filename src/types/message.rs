use serde::{Deserialize, Serialize};

/// Outbound message sent by the client (e.g. `subscribe` requests).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ClientMessage {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Subscribe request for a single topic name.
    pub fn subscribe(topic: &str) -> Self {
        Self::new(
            crate::types::constants::SUBSCRIBE_EVENT,
            serde_json::Value::String(topic.to_string()),
        )
    }
}

/// Inbound push event: a tagged payload `{topic, data}`.
///
/// `data` defaults to JSON null when the server omits it; payload shape
/// validation happens later, at the router boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    pub topic: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ServerMessage {
    pub fn new(topic: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscribe_message_shape() {
        let msg = ClientMessage::subscribe("system-stats");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""event":"subscribe""#));
        assert!(json.contains(r#""data":"system-stats""#));
    }

    #[test]
    fn test_server_message_round_trip() {
        let msg = ServerMessage::new("battery-alerts", json!({"criticalBattery": 2}));
        let serialized = serde_json::to_string(&msg).unwrap();
        let deserialized: ServerMessage = serde_json::from_str(&serialized).unwrap();
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_server_message_missing_data_defaults_to_null() {
        let msg: ServerMessage = serde_json::from_str(r#"{"topic":"notifications"}"#).unwrap();
        assert_eq!(msg.topic, "notifications");
        assert_eq!(msg.data, serde_json::Value::Null);
    }
}
