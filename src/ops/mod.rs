// Ops module - Generic async-operation wrapper (timeout, retry, cancellation)
pub mod controller;
pub mod error;
pub mod retry;

pub use controller::{AsyncOperation, OperationOptions, OperationState};
pub use error::{ErrorKind, OpError};
pub use retry::{retry_with_backoff, with_timeout, RetryPolicy};
