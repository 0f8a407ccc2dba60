use super::connection::ConnectionState;
use crate::infrastructure::{Backoff, TaskManager};
use tokio::sync::watch;

/// Consolidated mutable state for RealtimeClient
/// Using a single struct reduces lock contention
pub struct ClientState {
    /// Background task manager (read loop)
    pub task_manager: TaskManager,

    /// Reconnect attempt counter and delay schedule
    pub backoff: Backoff,

    /// Whether the disconnect was manual (prevents auto-reconnect)
    pub was_manual_disconnect: bool,

    /// A reconnect loop is in progress; duplicate schedules must not stack
    pub reconnecting: bool,

    /// The attempt limit was exhausted; latched until the next successful connect
    pub gave_up: bool,

    /// Sender for state change notifications
    pub state_change_tx: Option<watch::Sender<(ConnectionState, bool)>>,
}

impl ClientState {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            task_manager: TaskManager::new(),
            backoff,
            was_manual_disconnect: false,
            reconnecting: false,
            gave_up: false,
            state_change_tx: None,
        }
    }

    /// Notify state change watchers
    pub fn notify_state_change(&self, state: ConnectionState, manual: bool) {
        if let Some(tx) = &self.state_change_tx {
            if tx.send((state, manual)).is_err() {
                tracing::debug!(
                    "State change watcher disconnected, could not notify state: {:?}",
                    state
                );
            }
        }
    }
}
