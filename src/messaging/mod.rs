// Messaging module - Topics, payload parsing, and event routing
pub mod payloads;
pub mod router;
pub mod topic;

pub use router::EventRouter;
pub use topic::Topic;
