use std::time::Duration;

/// Bounded exponential backoff for reconnection scheduling.
///
/// Delays follow `base * 2^(attempts - 1)` with no jitter. The attempt
/// counter is monotonic since the last successful connect and must be
/// `reset()` when a connection is established or manually closed. Once
/// the configured maximum is exceeded, `next_delay` returns `None` and
/// the caller is expected to give up and report a terminal failure.
#[derive(Debug)]
pub struct Backoff {
    attempts: u32,
    max_attempts: u32,
    base_delay: Duration,
}

impl Backoff {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            base_delay,
        }
    }

    /// Records one more attempt and returns the delay to wait before it,
    /// or `None` once the attempt limit is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.attempts > self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.pow(self.attempts - 1))
    }

    /// Attempts made since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            crate::types::DEFAULT_MAX_RECONNECT_ATTEMPTS,
            Duration::from_millis(crate::types::DEFAULT_RECONNECT_BASE_DELAY_MS),
        )
    }
}
