//! Orchestration of stdio tool servers over JSON-RPC 2.0.
//!
//! Layers, leaves first: [`protocol`] (codec), [`transport`] (one child
//! process), [`client`] (request correlation), [`registry`] (descriptors),
//! [`manager`] (fleet and error boundary) and [`operations`] (typed
//! builders). Collaborators only need the manager, the operation DTOs from
//! `vcsmcp-core` and the `VcsOperations` extension trait.

#![deny(unsafe_code)]

pub mod client;
pub mod env;
pub mod manager;
pub mod operations;
pub mod protocol;
pub mod registry;
pub(crate) mod shutdown;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

pub use client::{ConnectionState, McpClientError, McpConnection};
pub use env::{EnvProvider, SystemEnv};
pub use manager::{McpManager, McpManagerError};
pub use operations::VcsOperations;
pub use protocol::{ErrorInfo, Message, RequestId};
pub use registry::{RegistryError, ServerRegistry};
pub use transport::{
    ExitInfo, StdioLauncher, StdioTransport, Transport, TransportError, TransportEvent,
    TransportHandle, TransportLauncher,
};

// Re-export domain types from core for convenience
pub use vcsmcp_core::{
    Backend, McpTool, ServerDescriptor, ToolResult, VcsExecutor, VcsOperation, VcsOperationResult,
};
