//! Core domain types and port definitions for vcsmcp.
//!
//! This crate holds everything that crosses crate boundaries: server
//! descriptors, tool results, the `VcsOperation`/`VcsOperationResult` DTOs
//! handed to application code, lifecycle events, and the ports (traits)
//! adapters implement. It has no process or protocol code of its own.
#![deny(unsafe_code)]

pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    Backend, Capability, ContentItem, FailureCategory, McpTool, ServerDescriptor, ToolResult,
    UnknownBackend, VcsOperation, VcsOperationResult, DEFAULT_CALL_TIMEOUT_SECS,
};
pub use events::VcsEvent;
pub use ports::{EventEmitter, NoopEmitter, VcsExecutor};

// Re-export path utilities
pub use paths::{
    CONFIG_ENV, PathError, SERVERS_DIR_ENV, default_config_path, default_servers_dir,
    resolve_config_path, resolve_servers_dir,
};
