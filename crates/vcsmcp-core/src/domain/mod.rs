//! Domain types shared by the protocol layer and its adapters.

mod backend;
mod operation;
mod server;
mod tool;

pub use backend::{Backend, UnknownBackend};
pub use operation::{FailureCategory, VcsOperation, VcsOperationResult};
pub use server::{Capability, DEFAULT_CALL_TIMEOUT_SECS, ServerDescriptor};
pub use tool::{ContentItem, McpTool, ToolResult};
