use super::error::OpError;
use futures::future::BoxFuture;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Maximum random jitter added to each retry delay.
const JITTER_MAX_MS: u64 = 1_000;

/// Immutable retry policy for one operation invocation.
///
/// Delays grow as `base_delay * backoff_factor^(attempt - 1)`, capped at
/// `max_delay`, with up to one second of random jitter added so
/// simultaneous clients do not retry in lockstep.
#[derive(Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub retry_condition: Arc<dyn Fn(&OpError) -> bool + Send + Sync>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Policy that disables retries entirely.
    pub fn none() -> Self {
        Self::new(1)
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_retry_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&OpError) -> bool + Send + Sync + 'static,
    {
        self.retry_condition = Arc::new(condition);
        self
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32 - 1);
        let capped = (exp as u64).min(self.max_delay.as_millis() as u64);
        let jitter = rand::thread_rng().gen_range(0..JITTER_MAX_MS);
        Duration::from_millis(capped + jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
            retry_condition: Arc::new(OpError::is_retryable),
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_factor", &self.backoff_factor)
            .finish_non_exhaustive()
    }
}

/// Runs `op` up to `policy.max_attempts` times.
///
/// A failure that the retry condition rejects, or one on the final
/// attempt, propagates immediately with no extra delay.
pub async fn retry_with_backoff<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T, OpError>
where
    F: FnMut() -> BoxFuture<'static, Result<T, OpError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !(policy.retry_condition)(&err) {
                    return Err(err);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "operation failed, retrying after backoff"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Races `fut` against a timer. On expiry the future is dropped (not
/// preempted) and a timeout-kind error is returned.
pub async fn with_timeout<T, Fut>(duration: Duration, fut: Fut) -> Result<T, OpError>
where
    Fut: Future<Output = Result<T, OpError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(OpError::timeout(format!(
            "operation timed out after {}ms",
            duration.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::error::ErrorKind;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fail_n_times(
        failures: u32,
        err: fn(&str) -> OpError,
    ) -> (Arc<AtomicU32>, impl FnMut() -> BoxFuture<'static, Result<String, OpError>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);
        let op = move || {
            let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
            let result = if n <= failures {
                Err(err("transient failure"))
            } else {
                Ok(format!("attempt-{n}"))
            };
            async move { result }.boxed()
        };
        (calls, op)
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let policy = RetryPolicy::new(3).with_base_delay(Duration::from_millis(10));
        let (calls, op) = fail_n_times(2, |m| OpError::network(m));

        let result = retry_with_backoff(&policy, op).await;
        assert_eq!(result.unwrap(), "attempt-3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_propagates_immediately() {
        let policy = RetryPolicy::new(5).with_base_delay(Duration::from_millis(10));
        let (calls, op) = fail_n_times(10, |m| OpError::validation(m));

        let start = tokio::time::Instant::now();
        let result = retry_with_backoff(&policy, op).await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // No delay at all on non-retryable failure
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_propagate_last_error() {
        let policy = RetryPolicy::new(3).with_base_delay(Duration::from_millis(10));
        let (calls, op) = fail_n_times(10, |m| OpError::network(m));

        let result = retry_with_backoff(&policy, op).await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::Network);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_retry_condition_rejects() {
        let policy = RetryPolicy::new(3).with_retry_condition(|_| false);
        let (calls, op) = fail_n_times(10, |m| OpError::network(m));

        let result = retry_with_backoff(&policy, op).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let slow = async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, OpError>(1)
        };
        let result = with_timeout(Duration::from_millis(50), slow).await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let quick = async { Ok::<_, OpError>(7) };
        assert_eq!(with_timeout(Duration::from_secs(1), quick).await.unwrap(), 7);

        let failing = async { Err::<u32, _>(OpError::validation("bad")) };
        let err = with_timeout(Duration::from_secs(1), failing).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy::new(10)
            .with_base_delay(Duration::from_millis(1_000))
            .with_max_delay(Duration::from_millis(4_000));
        // Attempt 5 would be 16s uncapped; jitter adds at most one second.
        let delay = policy.delay_for_attempt(5);
        assert!(delay >= Duration::from_millis(4_000));
        assert!(delay < Duration::from_millis(4_000 + JITTER_MAX_MS));
    }
}
