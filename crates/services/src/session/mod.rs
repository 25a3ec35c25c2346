mod bridge;
mod context;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use bridge::SessionBridge;
pub use context::SessionContext;
pub use workflow::{SessionWorkflow, TopicPlacement};
