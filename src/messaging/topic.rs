use crate::types::constants::topics;

/// The fixed set of data topics the client subscribes to on every
/// successful (re)connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SystemStats,
    UavStatus,
    BatteryAlerts,
    FlightActivity,
    HibernatePod,
    Notifications,
    EmergencyAlerts,
    LocationUpdates,
}

impl Topic {
    pub const ALL: [Topic; 8] = [
        Topic::SystemStats,
        Topic::UavStatus,
        Topic::BatteryAlerts,
        Topic::FlightActivity,
        Topic::HibernatePod,
        Topic::Notifications,
        Topic::EmergencyAlerts,
        Topic::LocationUpdates,
    ];

    /// Parses a topic name; unknown names yield `None` and are dropped
    /// by the router.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            topics::SYSTEM_STATS => Some(Self::SystemStats),
            topics::UAV_STATUS => Some(Self::UavStatus),
            topics::BATTERY_ALERTS => Some(Self::BatteryAlerts),
            topics::FLIGHT_ACTIVITY => Some(Self::FlightActivity),
            topics::HIBERNATE_POD => Some(Self::HibernatePod),
            topics::NOTIFICATIONS => Some(Self::Notifications),
            topics::EMERGENCY_ALERTS => Some(Self::EmergencyAlerts),
            topics::LOCATION_UPDATES => Some(Self::LocationUpdates),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemStats => topics::SYSTEM_STATS,
            Self::UavStatus => topics::UAV_STATUS,
            Self::BatteryAlerts => topics::BATTERY_ALERTS,
            Self::FlightActivity => topics::FLIGHT_ACTIVITY,
            Self::HibernatePod => topics::HIBERNATE_POD,
            Self::Notifications => topics::NOTIFICATIONS,
            Self::EmergencyAlerts => topics::EMERGENCY_ALERTS,
            Self::LocationUpdates => topics::LOCATION_UPDATES,
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_round_trip() {
        for topic in Topic::ALL {
            assert_eq!(Topic::parse(topic.as_str()), Some(topic));
        }
    }

    #[test]
    fn test_unknown_topic_yields_none() {
        assert_eq!(Topic::parse("weather-updates"), None);
        assert_eq!(Topic::parse(""), None);
        assert_eq!(Topic::parse("SYSTEM-STATS"), None);
    }

    #[test]
    fn test_all_covers_eight_topics() {
        assert_eq!(Topic::ALL.len(), 8);
    }
}
