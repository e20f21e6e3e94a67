//! Tool server fleet management.
//!
//! The manager owns one connection per started server and is the only
//! component that mutates the connection map. `execute_vcs_operation` is the
//! error boundary: nothing below it leaks past as an `Err` or a panic.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use vcsmcp_core::{
    EventEmitter, FailureCategory, McpTool, NoopEmitter, VcsEvent, VcsExecutor, VcsOperation,
    VcsOperationResult,
};

use crate::client::{ConnectionState, McpClientError, McpConnection};
use crate::registry::ServerRegistry;
use crate::transport::{StdioLauncher, TransportLauncher};

/// Errors that can occur during manager operations.
#[derive(Debug, Error)]
pub enum McpManagerError {
    #[error("Unknown server: {0}")]
    UnknownServer(String),

    #[error("Server not running: {0}")]
    NotRunning(String),

    #[error("Failed to start server '{server}': {source}")]
    StartFailed {
        server: String,
        #[source]
        source: McpClientError,
    },

    #[error(transparent)]
    Client(#[from] McpClientError),
}

impl McpManagerError {
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::UnknownServer(_) => FailureCategory::Configuration,
            Self::NotRunning(_) => FailureCategory::Transport,
            Self::StartFailed { source, .. } | Self::Client(source) => source.category(),
        }
    }
}

/// Manager for the tool server fleet.
pub struct McpManager {
    /// Frozen at construction
    registry: ServerRegistry,
    launcher: Arc<dyn TransportLauncher>,
    emitter: Arc<dyn EventEmitter>,
    /// Servers spawned at least once and not stopped
    connections: RwLock<HashMap<String, Arc<McpConnection>>>,
    active_names: RwLock<BTreeSet<String>>,
    /// Serializes start/stop per server
    gates: HashMap<String, Arc<Mutex<()>>>,
}

impl McpManager {
    /// Create a manager that launches servers as child processes.
    pub fn new(registry: ServerRegistry) -> Self {
        Self::with_launcher(registry, Arc::new(StdioLauncher))
    }

    pub fn with_launcher(registry: ServerRegistry, launcher: Arc<dyn TransportLauncher>) -> Self {
        let gates = registry
            .names()
            .into_iter()
            .map(|name| (name, Arc::new(Mutex::new(()))))
            .collect();

        Self {
            registry,
            launcher,
            emitter: Arc::new(NoopEmitter::new()),
            connections: RwLock::new(HashMap::new()),
            active_names: RwLock::new(BTreeSet::new()),
            gates,
        }
    }

    /// Route lifecycle events to `emitter`.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub const fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Start one server.
    ///
    /// Returns `Ok(false)` for a disabled server; that is an expected state,
    /// not a fault. Starting an active server is a no-op.
    pub async fn start_server(&self, name: &str) -> Result<bool, McpManagerError> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| McpManagerError::UnknownServer(name.to_string()))?;

        if !descriptor.enabled {
            tracing::debug!(server_name = %name, "Server disabled, not starting");
            self.emitter.emit(VcsEvent::server_skipped(name));
            return Ok(false);
        }

        let gate = self.gate(name)?;
        let _guard = gate.lock().await;

        if self.active_connection(name).await.is_some() {
            return Ok(true);
        }

        let existing = self.connections.read().await.get(name).cloned();
        let connection = existing.unwrap_or_else(|| {
            Arc::new(McpConnection::with_launcher(
                descriptor.clone(),
                Arc::clone(&self.launcher),
            ))
        });

        match connection.start().await {
            Ok(()) => {
                self.connections
                    .write()
                    .await
                    .insert(name.to_string(), connection);
                self.active_names.write().await.insert(name.to_string());

                tracing::info!(server_name = %name, "Server started");
                self.emitter.emit(VcsEvent::server_started(name));
                Ok(true)
            }
            Err(e) => {
                self.active_names.write().await.remove(name);

                tracing::warn!(server_name = %name, error = %e, "Failed to start server");
                self.emitter
                    .emit(VcsEvent::server_start_failed(name, e.to_string()));
                Err(McpManagerError::StartFailed {
                    server: name.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Attempt every registered server concurrently.
    ///
    /// One server failing never blocks the others. Returns the names that
    /// actually started, in registry order.
    pub async fn start_all_servers(&self) -> Vec<String> {
        let names = self.registry.names();
        let attempts = join_all(names.iter().map(|name| self.start_server(name))).await;

        names
            .into_iter()
            .zip(attempts)
            .filter_map(|(name, attempt)| match attempt {
                Ok(true) => Some(name),
                Ok(false) => None,
                Err(e) => {
                    tracing::debug!(server_name = %name, error = %e, "Server skipped in start_all");
                    None
                }
            })
            .collect()
    }

    /// Stop one server. Returns whether a connection was stopped.
    pub async fn stop_server(&self, name: &str) -> Result<bool, McpManagerError> {
        if self.registry.get(name).is_none() {
            return Err(McpManagerError::UnknownServer(name.to_string()));
        }

        let gate = self.gate(name)?;
        let _guard = gate.lock().await;

        self.active_names.write().await.remove(name);
        let connection = self.connections.write().await.remove(name);

        let Some(connection) = connection else {
            return Ok(false);
        };

        connection.stop().await;
        tracing::info!(server_name = %name, "Server stopped");
        self.emitter.emit(VcsEvent::server_stopped(name));
        Ok(true)
    }

    /// Stop every started server.
    pub async fn stop_all_servers(&self) {
        let names: Vec<String> = self.connections.read().await.keys().cloned().collect();

        let results = join_all(names.iter().map(|name| self.stop_server(name))).await;
        for (name, result) in names.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(server_name = %name, error = %e, "Failed to stop server");
            }
        }
    }

    /// Execute one operation. Never fails: every problem becomes a
    /// `VcsOperationResult` with `success == false`.
    ///
    /// An enabled server that was never started, or was stopped, is started
    /// once, lazily. A server whose process died stays down until
    /// `start_server` is called.
    pub async fn execute_vcs_operation(&self, operation: VcsOperation) -> VcsOperationResult {
        let VcsOperation {
            server_name,
            tool_name,
            arguments,
        } = operation;

        let connection = match self.connection_for(&server_name).await {
            Ok(connection) => connection,
            Err(failure) => return failure,
        };

        let arguments = Value::Object(arguments.into_iter().collect());
        tracing::debug!(server_name = %server_name, tool = %tool_name, "Executing operation");

        match connection.call_tool(&tool_name, arguments).await {
            Ok(result) if result.is_error => {
                let message = result.first_text().unwrap_or_default().to_string();
                VcsOperationResult::failure(server_name, FailureCategory::Tool, message)
            }
            Ok(result) => VcsOperationResult::success(server_name, result.joined_text()),
            Err(e) => {
                tracing::debug!(
                    server_name = %server_name,
                    tool = %tool_name,
                    error = %e,
                    "Operation failed"
                );
                client_failure(server_name, &e)
            }
        }
    }

    /// Resolve the running connection for an operation, starting it if needed.
    async fn connection_for(&self, name: &str) -> Result<Arc<McpConnection>, VcsOperationResult> {
        let not_available = |category, reason: &str| {
            VcsOperationResult::failure(
                name,
                category,
                format!("server '{name}' not available: {reason}"),
            )
        };

        let Some(descriptor) = self.registry.get(name) else {
            return Err(not_available(FailureCategory::Configuration, "unknown server"));
        };
        if !descriptor.enabled {
            return Err(not_available(FailureCategory::Configuration, "server is disabled"));
        }

        if let Some(connection) = self.active_connection(name).await {
            return Ok(connection);
        }

        // Only never-started or stopped servers start lazily; a dead one waits for start_server
        let state = self.connections.read().await.get(name).map(|c| c.state());
        if state == Some(ConnectionState::Failed) {
            return Err(not_available(
                FailureCategory::Transport,
                "server failed (restart with start_server)",
            ));
        }

        match self.start_server(name).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(not_available(FailureCategory::Configuration, "server is disabled"));
            }
            Err(e) => return Err(not_available(e.category(), &e.to_string())),
        }

        self.active_connection(name)
            .await
            .ok_or_else(|| not_available(FailureCategory::Transport, "server exited after start"))
    }

    /// List the tools of an active server. Never starts anything.
    pub async fn list_available_tools(&self, name: &str) -> Result<Vec<McpTool>, McpManagerError> {
        if self.registry.get(name).is_none() {
            return Err(McpManagerError::UnknownServer(name.to_string()));
        }

        let connection = self
            .active_connection(name)
            .await
            .ok_or_else(|| McpManagerError::NotRunning(name.to_string()))?;

        Ok(connection.list_tools().await?)
    }

    /// Server name → active, for every registered server. Never starts anything.
    pub async fn get_server_status(&self) -> BTreeMap<String, bool> {
        let mut status = BTreeMap::new();
        for name in self.registry.names() {
            let active = self.active_connection(&name).await.is_some();
            status.insert(name, active);
        }
        status
    }

    /// Server name → connection state, for every registered server.
    pub async fn server_states(&self) -> BTreeMap<String, ConnectionState> {
        let connections = self.connections.read().await;
        self.registry
            .names()
            .into_iter()
            .map(|name| {
                let state = connections
                    .get(&name)
                    .map_or(ConnectionState::Stopped, |c| c.state());
                (name, state)
            })
            .collect()
    }

    /// Names that are active and whose connection is still Running.
    pub async fn active_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for name in self.registry.names() {
            if self.active_connection(&name).await.is_some() {
                names.push(name);
            }
        }
        names
    }

    /// The connection for `name` if it is marked active and still Running.
    ///
    /// A transport can die between calls, so membership alone is not enough.
    async fn active_connection(&self, name: &str) -> Option<Arc<McpConnection>> {
        if !self.active_names.read().await.contains(name) {
            return None;
        }
        self.connections
            .read()
            .await
            .get(name)
            .filter(|c| c.state() == ConnectionState::Running)
            .cloned()
    }

    fn gate(&self, name: &str) -> Result<Arc<Mutex<()>>, McpManagerError> {
        self.gates
            .get(name)
            .cloned()
            .ok_or_else(|| McpManagerError::UnknownServer(name.to_string()))
    }
}

fn client_failure(server_name: String, error: &McpClientError) -> VcsOperationResult {
    let result = VcsOperationResult::failure(server_name, error.category(), error.to_string());
    match error.code() {
        Some(code) => result.with_code(code),
        None => result,
    }
}

#[async_trait]
impl VcsExecutor for McpManager {
    async fn execute(&self, operation: VcsOperation) -> VcsOperationResult {
        self.execute_vcs_operation(operation).await
    }

    async fn server_status(&self) -> BTreeMap<String, bool> {
        self.get_server_status().await
    }
}
