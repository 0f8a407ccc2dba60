// Infrastructure module - Background services and shared utilities
pub mod backoff;
pub mod http;
pub mod task_manager;

pub use backoff::Backoff;
pub use http::ApiClient;
pub use task_manager::TaskManager;
