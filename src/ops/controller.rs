use super::error::OpError;
use super::retry::{retry_with_backoff, with_timeout, RetryPolicy};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Observable state of one logical async operation.
#[derive(Debug, Clone)]
pub struct OperationState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<OpError>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

/// Cross-cutting options applied to every execution of an operation.
#[derive(Debug, Clone, Default)]
pub struct OperationOptions {
    /// Per-attempt timeout; `None` disables the timeout wrapper.
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl OperationOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

struct ExecState<A> {
    last_args: Option<A>,
    current: Option<CancellationToken>,
}

/// Wraps a caller-supplied async function with timeout, retry,
/// cancellation, and observable `{data, loading, error, last_updated}`
/// state, so UI units do not reimplement those concerns each time.
///
/// Starting a new `execute` cancels any prior in-flight run of the same
/// controller; a superseded run never commits its outcome. Errors are
/// classified, stored in state, and never escape as `Err` — failed
/// executions return `None`.
pub struct AsyncOperation<A, T> {
    op: Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, OpError>> + Send + Sync>,
    options: OperationOptions,
    state: Arc<RwLock<OperationState<T>>>,
    exec: Arc<Mutex<ExecState<A>>>,
    disposed: Arc<AtomicBool>,
}

impl<A, T> Clone for AsyncOperation<A, T> {
    fn clone(&self) -> Self {
        Self {
            op: Arc::clone(&self.op),
            options: self.options.clone(),
            state: Arc::clone(&self.state),
            exec: Arc::clone(&self.exec),
            disposed: Arc::clone(&self.disposed),
        }
    }
}

impl<A, T> AsyncOperation<A, T>
where
    A: Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(op: F, options: OperationOptions) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<T, OpError>> + Send + 'static,
    {
        Self {
            op: Arc::new(move |args| op(args).boxed()),
            options,
            state: Arc::new(RwLock::new(OperationState::default())),
            exec: Arc::new(Mutex::new(ExecState {
                last_args: None,
                current: None,
            })),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current state snapshot.
    pub async fn state(&self) -> OperationState<T> {
        self.state.read().await.clone()
    }

    /// Runs the operation, superseding any in-flight execution.
    ///
    /// Returns the result, or `None` when the run failed, was cancelled,
    /// superseded, or the controller was disposed.
    pub async fn execute(&self, args: A) -> Option<T> {
        if self.disposed.load(Ordering::SeqCst) {
            tracing::debug!("execute called on disposed operation, ignoring");
            return None;
        }

        let token = {
            let mut exec = self.exec.lock().await;
            if let Some(prev) = exec.current.take() {
                prev.cancel();
            }
            let token = CancellationToken::new();
            exec.current = Some(token.clone());
            exec.last_args = Some(args.clone());
            token
        };

        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let op = Arc::clone(&self.op);
        let timeout = self.options.timeout;
        let attempt = move || {
            let fut = op(args.clone());
            async move {
                match timeout {
                    Some(duration) => with_timeout(duration, fut).await,
                    None => fut.await,
                }
            }
            .boxed()
        };

        let result = tokio::select! {
            _ = token.cancelled() => return None,
            result = retry_with_backoff(&self.options.retry, attempt) => result,
        };

        // A newer execute, cancel, or dispose may have superseded this run
        // while the final continuation was pending.
        if token.is_cancelled() || self.disposed.load(Ordering::SeqCst) {
            return None;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(value) => {
                state.data = Some(value.clone());
                state.loading = false;
                state.error = None;
                state.last_updated = Some(Utc::now());
                Some(value)
            }
            Err(err) => {
                tracing::warn!(kind = err.kind.as_str(), error = %err, "operation failed");
                state.loading = false;
                state.error = Some(err);
                None
            }
        }
    }

    /// Re-invokes `execute` with the last-used arguments; no-op when the
    /// operation was never executed.
    pub async fn retry(&self) -> Option<T> {
        let args = self.exec.lock().await.last_args.clone();
        match args {
            Some(args) => self.execute(args).await,
            None => {
                tracing::debug!("retry called before any execute, ignoring");
                None
            }
        }
    }

    /// Aborts any in-flight run and clears all state to initial values.
    pub async fn reset(&self) {
        self.abort_current().await;
        *self.state.write().await = OperationState::default();
    }

    /// Aborts any in-flight run, clearing only the loading flag; last
    /// known data and error are preserved.
    pub async fn cancel(&self) {
        self.abort_current().await;
        self.state.write().await.loading = false;
    }

    /// Permanently forbids state commits, aborting any in-flight run.
    /// Mirrors the owning UI unit being torn down.
    pub async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.abort_current().await;
    }

    async fn abort_current(&self) {
        let mut exec = self.exec.lock().await;
        if let Some(token) = exec.current.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::error::ErrorKind;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::Notify;

    fn counting_op() -> (
        Arc<AtomicU32>,
        AsyncOperation<&'static str, String>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);
        let op = AsyncOperation::new(
            move |tag: &'static str| {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(format!("{tag}-{n}")) }
            },
            OperationOptions::default(),
        );
        (calls, op)
    }

    #[tokio::test]
    async fn test_execute_commits_success() {
        let (_, op) = counting_op();

        let result = op.execute("run").await;
        assert_eq!(result.as_deref(), Some("run-1"));

        let state = op.state().await;
        assert_eq!(state.data.as_deref(), Some("run-1"));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_failure_stored_not_raised() {
        let op: AsyncOperation<(), u32> = AsyncOperation::new(
            |_| async { Err(OpError::validation("bad input")) },
            OperationOptions::default(),
        );

        assert_eq!(op.execute(()).await, None);

        let state = op.state().await;
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert_eq!(state.error.unwrap().kind, ErrorKind::Validation);
        assert!(state.last_updated.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_network_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);
        let op = AsyncOperation::new(
            move |_: ()| {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(OpError::network("connection reset"))
                    } else {
                        Ok("recovered")
                    }
                }
            },
            OperationOptions::default().with_retry(
                RetryPolicy::new(3).with_base_delay(Duration::from_millis(10)),
            ),
        );

        assert_eq!(op.execute(()).await, Some("recovered"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let state = op.state().await;
        assert_eq!(state.data, Some("recovered"));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_superseding_execute_wins() {
        let gate = Arc::new(Notify::new());
        let gate_clone = Arc::clone(&gate);
        let op = AsyncOperation::new(
            move |tag: &'static str| {
                let gate = Arc::clone(&gate_clone);
                async move {
                    if tag == "slow" {
                        gate.notified().await;
                    }
                    Ok(tag.to_string())
                }
            },
            OperationOptions::default(),
        );

        let slow = op.clone();
        let first = tokio::spawn(async move { slow.execute("slow").await });

        // Wait for the first run to take the loading flag.
        while !op.state().await.loading {
            tokio::task::yield_now().await;
        }

        assert_eq!(op.execute("fast").await.as_deref(), Some("fast"));

        // Release the superseded run; its outcome must never be committed.
        gate.notify_one();
        assert_eq!(first.await.unwrap(), None);
        assert_eq!(op.state().await.data.as_deref(), Some("fast"));
    }

    #[tokio::test]
    async fn test_retry_reuses_last_args() {
        let (calls, op) = counting_op();

        assert_eq!(op.execute("job").await.as_deref(), Some("job-1"));
        assert_eq!(op.retry().await.as_deref(), Some("job-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_before_execute_is_noop() {
        let (calls, op) = counting_op();

        assert_eq!(op.retry().await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(op.state().await.data.is_none());
    }

    #[tokio::test]
    async fn test_reset_round_trip() {
        let op: AsyncOperation<(), u32> = AsyncOperation::new(
            |_| async { Err(OpError::network("down")) },
            OperationOptions::default().with_retry(RetryPolicy::none()),
        );

        op.execute(()).await;
        op.execute(()).await;
        op.reset().await;

        let state = op.state().await;
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_cancel_preserves_data() {
        let gate = Arc::new(Notify::new());
        let gate_clone = Arc::clone(&gate);
        let op = AsyncOperation::new(
            move |tag: &'static str| {
                let gate = Arc::clone(&gate_clone);
                async move {
                    if tag == "slow" {
                        gate.notified().await;
                    }
                    Ok(tag.to_string())
                }
            },
            OperationOptions::default(),
        );

        assert!(op.execute("first").await.is_some());

        let slow = op.clone();
        let pending = tokio::spawn(async move { slow.execute("slow").await });
        while !op.state().await.loading {
            tokio::task::yield_now().await;
        }

        op.cancel().await;
        assert_eq!(pending.await.unwrap(), None);

        let state = op.state().await;
        assert!(!state.loading);
        assert_eq!(state.data.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_disposed_operation_never_commits() {
        let (calls, op) = counting_op();

        op.dispose().await;
        assert_eq!(op.execute("late").await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(op.state().await.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_attempt_timeout_classified() {
        let op: AsyncOperation<(), u32> = AsyncOperation::new(
            |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(1)
            },
            OperationOptions::default()
                .with_timeout(Duration::from_millis(50))
                .with_retry(RetryPolicy::none()),
        );

        assert_eq!(op.execute(()).await, None);
        assert_eq!(op.state().await.error.unwrap().kind, ErrorKind::Timeout);
    }
}
