//! Connection to a single tool server.
//!
//! A connection owns one transport and the table of requests waiting for a
//! response. Its read loop is the only background task and the only thing
//! that resolves waiters, apart from timeouts and teardown.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::{RwLock, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use vcsmcp_core::{Capability, FailureCategory, McpTool, ServerDescriptor, ToolResult};

use crate::protocol::{self, ErrorInfo, Message, RequestId, error_codes};
use crate::transport::{
    StdioLauncher, Transport, TransportError, TransportEvent, TransportLauncher,
};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Stopped,
    Starting,
    Running,
    Stopping,
    /// The transport died while running. Only an explicit `start()` leaves this state.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Failed => "failed",
        };
        f.pad(label)
    }
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, Error)]
pub enum McpClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("connection to server '{server}' closed: {reason}")]
    TransportClosed { server: String, reason: String },

    #[error("server '{server}' did not answer '{method}' within {timeout_secs}s")]
    Timeout {
        server: String,
        method: String,
        timeout_secs: u64,
    },

    #[error("server '{server}' is not running (state: {state})")]
    NotRunning {
        server: String,
        state: ConnectionState,
    },

    #[error("server '{server}' returned error {error}")]
    Server { server: String, error: ErrorInfo },

    #[error("protocol error from server '{server}': {reason}")]
    Protocol { server: String, reason: String },
}

impl McpClientError {
    /// Classify the failure for the operation boundary.
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::Transport(_) | Self::TransportClosed { .. } | Self::NotRunning { .. } => {
                FailureCategory::Transport
            }
            Self::Timeout { .. } => FailureCategory::Timeout,
            Self::Protocol { .. } => FailureCategory::Protocol,
            Self::Server { error, .. } => match error.code {
                error_codes::PARSE_ERROR | error_codes::INVALID_REQUEST => {
                    FailureCategory::Protocol
                }
                _ => FailureCategory::Tool,
            },
        }
    }

    /// JSON-RPC error code, when the server supplied one.
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Server { error, .. } => Some(error.code),
            _ => None,
        }
    }
}

type Outcome = Result<Result<Value, ErrorInfo>, McpClientError>;

#[derive(Default)]
struct PendingInner {
    waiters: HashMap<RequestId, oneshot::Sender<Outcome>>,
    sealed: bool,
}

/// Requests in flight, keyed by id.
///
/// Every registered id leaves the table exactly once: through `resolve`,
/// `cancel` or `seal`. A sealed table refuses new registrations until the
/// connection is started again, so teardown can never strand a waiter.
#[derive(Default)]
struct PendingTable {
    inner: Mutex<PendingInner>,
}

impl PendingTable {
    fn lock(&self) -> std::sync::MutexGuard<'_, PendingInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, id: RequestId) -> Option<oneshot::Receiver<Outcome>> {
        let mut inner = self.lock();
        if inner.sealed {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        inner.waiters.insert(id, tx);
        Some(rx)
    }

    /// Returns `false` if no waiter was registered under `id`.
    fn resolve(&self, id: &RequestId, outcome: Result<Value, ErrorInfo>) -> bool {
        let waiter = self.lock().waiters.remove(id);
        match waiter {
            Some(waiter) => {
                // The caller may have given up already
                let _ = waiter.send(Ok(outcome));
                true
            }
            None => false,
        }
    }

    fn cancel(&self, id: &RequestId) -> bool {
        self.lock().waiters.remove(id).is_some()
    }

    /// Fail every waiter and refuse further registrations.
    fn seal(&self, error: &McpClientError) -> usize {
        let waiters: Vec<_> = {
            let mut inner = self.lock();
            inner.sealed = true;
            inner.waiters.drain().map(|(_, waiter)| waiter).collect()
        };
        let count = waiters.len();
        for waiter in waiters {
            let _ = waiter.send(Err(error.clone()));
        }
        count
    }

    fn reopen(&self) {
        self.lock().sealed = false;
    }

    fn len(&self) -> usize {
        self.lock().waiters.len()
    }
}

struct Session {
    transport: Arc<dyn Transport>,
    reader: JoinHandle<()>,
}

#[derive(Debug, Default, Deserialize)]
struct ListToolsResult {
    #[serde(default)]
    tools: Vec<McpTool>,
}

/// Client side of one server: a transport plus request correlation.
pub struct McpConnection {
    descriptor: ServerDescriptor,
    launcher: Arc<dyn TransportLauncher>,
    state: Arc<watch::Sender<ConnectionState>>,
    pending: Arc<PendingTable>,
    /// Never reset, so ids stay unique for the lifetime of this object
    next_id: AtomicI64,
    /// Write-locked by start/stop only
    session: RwLock<Option<Session>>,
}

impl McpConnection {
    /// Create a stopped connection that launches a real child process.
    pub fn new(descriptor: ServerDescriptor) -> Self {
        Self::with_launcher(descriptor, Arc::new(StdioLauncher))
    }

    /// Create a stopped connection with a custom launcher.
    pub fn with_launcher(
        descriptor: ServerDescriptor,
        launcher: Arc<dyn TransportLauncher>,
    ) -> Self {
        Self {
            descriptor,
            launcher,
            state: Arc::new(watch::Sender::new(ConnectionState::Stopped)),
            pending: Arc::new(PendingTable::default()),
            next_id: AtomicI64::new(1),
            session: RwLock::new(None),
        }
    }

    pub fn descriptor(&self) -> &ServerDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Number of requests currently awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Launch the server process.
    ///
    /// There is no handshake: the connection is Running as soon as the
    /// launcher reports a live process. A no-op when already Running.
    pub async fn start(&self) -> Result<(), McpClientError> {
        let mut session = self.session.write().await;

        if session.is_some() && self.state() == ConnectionState::Running {
            return Ok(());
        }

        // Leftovers from a transport that died underneath us
        if let Some(stale) = session.take() {
            stale.transport.close().await;
            stale.reader.abort();
            let _ = stale.reader.await;
        }

        self.state.send_replace(ConnectionState::Starting);
        tracing::debug!(server_name = %self.name(), "Starting server connection");

        let handle = match self.launcher.launch(&self.descriptor).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(server_name = %self.name(), error = %e, "Failed to launch server");
                self.state.send_replace(ConnectionState::Failed);
                return Err(e.into());
            }
        };

        self.pending.reopen();
        // Running before the reader exists, so the reader's Running -> Failed cannot be lost
        self.state.send_replace(ConnectionState::Running);

        let reader = tokio::spawn(read_loop(
            self.descriptor.name.clone(),
            handle.events,
            Arc::clone(&self.pending),
            Arc::clone(&self.state),
        ));

        *session = Some(Session {
            transport: handle.transport,
            reader,
        });

        tracing::info!(server_name = %self.name(), "Server connection running");
        Ok(())
    }

    /// Fail all pending requests, close the transport and stop the read loop.
    pub async fn stop(&self) {
        let mut session = self.session.write().await;

        let Some(Session { transport, reader }) = session.take() else {
            self.state.send_replace(ConnectionState::Stopped);
            return;
        };

        self.state.send_replace(ConnectionState::Stopping);

        let failed = self.pending.seal(&McpClientError::TransportClosed {
            server: self.descriptor.name.clone(),
            reason: "connection stopped".to_string(),
        });
        if failed > 0 {
            tracing::debug!(server_name = %self.name(), failed, "Failed pending requests on stop");
        }

        transport.close().await;
        reader.abort();
        let _ = reader.await;

        self.state.send_replace(ConnectionState::Stopped);
        tracing::info!(server_name = %self.name(), "Server connection stopped");
    }

    /// Send a request and wait for its response.
    ///
    /// The outer `Result` covers connection failures; the inner one carries
    /// a JSON-RPC error response, which callers decide how to surface.
    pub async fn request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Result<Value, ErrorInfo>, McpClientError> {
        let transport = self.running_transport().await?;

        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        let rx = self
            .pending
            .register(id.clone())
            .ok_or_else(|| self.closed("connection is shutting down"))?;

        let frame = protocol::encode(&Message::request(id.clone(), method, params));
        tracing::trace!(server_name = %self.name(), %id, method, "Sending request");

        if let Err(e) = transport.send(&frame).await {
            self.pending.cancel(&id);
            return Err(e.into());
        }

        match timeout(self.descriptor.call_timeout(), rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(self.closed("response channel dropped")),
            Err(_) => {
                self.pending.cancel(&id);
                tracing::warn!(
                    server_name = %self.name(),
                    %id,
                    method,
                    timeout_secs = self.descriptor.call_timeout_secs,
                    "Request timed out"
                );
                Err(McpClientError::Timeout {
                    server: self.descriptor.name.clone(),
                    method: method.to_string(),
                    timeout_secs: self.descriptor.call_timeout_secs,
                })
            }
        }
    }

    /// Send a notification. No response is expected.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpClientError> {
        let transport = self.running_transport().await?;
        let frame = protocol::encode(&Message::notification(method, params));
        transport.send(&frame).await?;
        Ok(())
    }

    /// Call a tool (`tools/call`).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolResult, McpClientError> {
        let params = json!({
            "name": name,
            "arguments": arguments,
        });

        let result = self
            .request("tools/call", Some(params))
            .await?
            .map_err(|error| self.server_error(error))?;

        serde_json::from_value(result).map_err(|e| McpClientError::Protocol {
            server: self.descriptor.name.clone(),
            reason: format!("invalid tools/call result: {e}"),
        })
    }

    /// List the server's tools (`tools/list`).
    ///
    /// Servers without the tools capability are not asked.
    pub async fn list_tools(&self) -> Result<Vec<McpTool>, McpClientError> {
        if !self.descriptor.has_capability(Capability::Tools) {
            return Ok(Vec::new());
        }

        let result = self
            .request("tools/list", None)
            .await?
            .map_err(|error| self.server_error(error))?;

        let list: ListToolsResult =
            serde_json::from_value(result).map_err(|e| McpClientError::Protocol {
                server: self.descriptor.name.clone(),
                reason: format!("invalid tools/list result: {e}"),
            })?;
        Ok(list.tools)
    }

    async fn running_transport(&self) -> Result<Arc<dyn Transport>, McpClientError> {
        let not_running = |state| McpClientError::NotRunning {
            server: self.descriptor.name.clone(),
            state,
        };

        let state = self.state();
        if state != ConnectionState::Running {
            return Err(not_running(state));
        }

        self.session
            .read()
            .await
            .as_ref()
            .map(|session| Arc::clone(&session.transport))
            .ok_or_else(|| not_running(self.state()))
    }

    fn closed(&self, reason: &str) -> McpClientError {
        McpClientError::TransportClosed {
            server: self.descriptor.name.clone(),
            reason: reason.to_string(),
        }
    }

    fn server_error(&self, error: ErrorInfo) -> McpClientError {
        McpClientError::Server {
            server: self.descriptor.name.clone(),
            error,
        }
    }
}

async fn read_loop(
    server_name: String,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    pending: Arc<PendingTable>,
    state: Arc<watch::Sender<ConnectionState>>,
) {
    let reason = loop {
        match events.recv().await {
            Some(TransportEvent::Line(line)) => dispatch_line(&server_name, &line, &pending),
            Some(TransportEvent::Closed(info)) => break info.to_string(),
            None => break "transport dropped".to_string(),
        }
    };

    let failed = pending.seal(&McpClientError::TransportClosed {
        server: server_name.clone(),
        reason: reason.clone(),
    });

    let died = state.send_if_modified(|current| {
        if *current == ConnectionState::Running {
            *current = ConnectionState::Failed;
            true
        } else {
            false
        }
    });

    if died {
        tracing::warn!(
            server_name = %server_name,
            reason = %reason,
            failed,
            "Server transport closed"
        );
    } else {
        tracing::debug!(server_name = %server_name, reason = %reason, "Read loop finished");
    }
}

fn dispatch_line(server_name: &str, line: &str, pending: &PendingTable) {
    let message = match protocol::decode(line.as_bytes()) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                server_name = %server_name,
                code = e.code,
                error = %e.message,
                "Dropping undecodable line"
            );
            return;
        }
    };

    match message {
        Message::Response { id, outcome } => {
            if !pending.resolve(&id, outcome) {
                tracing::warn!(
                    server_name = %server_name,
                    %id,
                    "Dropping response for unknown request id"
                );
            }
        }
        Message::Request { id, method, .. } => {
            tracing::debug!(
                server_name = %server_name,
                %id,
                method = %method,
                "Ignoring server request"
            );
        }
        Message::Notification { method, .. } => {
            tracing::debug!(
                server_name = %server_name,
                method = %method,
                "Ignoring server notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{MemoryLauncher, response_line};

    fn descriptor(name: &str) -> ServerDescriptor {
        ServerDescriptor::new(name, "memory", Vec::<String>::new()).enabled(true)
    }

    fn connection(launcher: &Arc<MemoryLauncher>, name: &str) -> McpConnection {
        McpConnection::with_launcher(
            descriptor(name),
            Arc::clone(launcher) as Arc<dyn TransportLauncher>,
        )
    }

    #[test]
    fn test_pending_table_resolves_once() {
        let table = PendingTable::default();
        let id = RequestId::Number(1);
        let _rx = table.register(id.clone()).unwrap();

        assert!(table.resolve(&id, Ok(json!({}))));
        assert!(!table.resolve(&id, Ok(json!({}))));
        assert!(!table.cancel(&id));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_sealed_table_refuses_and_fails_waiters() {
        let table = PendingTable::default();
        let mut rx = table.register(RequestId::Number(1)).unwrap();

        let failed = table.seal(&McpClientError::TransportClosed {
            server: "git".to_string(),
            reason: "gone".to_string(),
        });
        assert_eq!(failed, 1);
        assert!(matches!(
            rx.try_recv(),
            Ok(Err(McpClientError::TransportClosed { .. }))
        ));
        assert!(table.register(RequestId::Number(2)).is_none());

        table.reopen();
        assert!(table.register(RequestId::Number(3)).is_some());
    }

    #[test]
    fn test_error_categories() {
        let server = |code| McpClientError::Server {
            server: "git".to_string(),
            error: ErrorInfo::new(code, "boom"),
        };
        assert_eq!(server(error_codes::PARSE_ERROR).category(), FailureCategory::Protocol);
        assert_eq!(server(error_codes::METHOD_NOT_FOUND).category(), FailureCategory::Tool);
        assert_eq!(server(42).code(), Some(42));

        let timeout = McpClientError::Timeout {
            server: "git".to_string(),
            method: "tools/call".to_string(),
            timeout_secs: 1,
        };
        assert_eq!(timeout.category(), FailureCategory::Timeout);
        assert_eq!(timeout.code(), None);
    }

    #[tokio::test]
    async fn test_call_before_start_is_not_running() {
        let launcher = Arc::new(MemoryLauncher::new());
        let conn = connection(&launcher, "git");

        let err = conn.call_tool("git_status", json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            McpClientError::NotRunning {
                state: ConnectionState::Stopped,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_start_is_idempotent_while_running() {
        let launcher = Arc::new(MemoryLauncher::new());
        let conn = connection(&launcher, "git");

        conn.start().await.unwrap();
        conn.start().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Running);
        assert_eq!(launcher.launches("git"), 1);
    }

    #[tokio::test]
    async fn test_failed_launch_leaves_failed_state() {
        let launcher = Arc::new(MemoryLauncher::new().failing("git"));
        let conn = connection(&launcher, "git");

        let err = conn.start().await.unwrap_err();
        assert!(matches!(err, McpClientError::Transport(TransportError::SpawnFailed { .. })));
        assert_eq!(conn.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_call_tool_returns_tool_result() {
        let launcher = Arc::new(MemoryLauncher::new());
        let conn = connection(&launcher, "git");
        conn.start().await.unwrap();

        let result = conn.call_tool("git_status", json!({"repo_path": "."})).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(result.joined_text(), "git_status ok");
        assert_eq!(conn.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_list_tools() {
        let launcher = Arc::new(MemoryLauncher::new());
        let conn = connection(&launcher, "git");
        conn.start().await.unwrap();

        let tools = conn.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "git_status");
    }

    #[tokio::test]
    async fn test_list_tools_without_capability_is_empty() {
        let launcher = Arc::new(MemoryLauncher::new());
        let mut descriptor = descriptor("jujutsu");
        descriptor.capabilities.clear();
        let conn = McpConnection::with_launcher(descriptor, launcher as Arc<dyn TransportLauncher>);
        conn.start().await.unwrap();

        assert!(conn.list_tools().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_response_surfaces_as_server_error() {
        let launcher = Arc::new(MemoryLauncher::new());
        let conn = connection(&launcher, "git");
        conn.start().await.unwrap();

        let outcome = conn.request("resources/list", None).await.unwrap();
        assert_eq!(outcome.unwrap_err().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_concurrent_calls_resolve_out_of_order() {
        let launcher = Arc::new(MemoryLauncher::new().manual("git"));
        let conn = Arc::new(connection(&launcher, "git"));
        conn.start().await.unwrap();
        let mut server = launcher.next_server_end().await;

        let first = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call_tool("git_log", json!({})).await }
        });
        let (first_id, _, _) = server.next_request().await;

        let second = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call_tool("git_status", json!({})).await }
        });
        let (second_id, _, _) = server.next_request().await;
        assert_ne!(first_id, second_id);

        server.respond_text(&second_id, "second");
        server.respond_text(&first_id, "first");

        assert_eq!(second.await.unwrap().unwrap().joined_text(), "second");
        assert_eq!(first.await.unwrap().unwrap().joined_text(), "first");
    }

    #[tokio::test]
    async fn test_unknown_id_and_garbage_are_ignored() {
        let launcher = Arc::new(MemoryLauncher::new().manual("git"));
        let conn = Arc::new(connection(&launcher, "git"));
        conn.start().await.unwrap();
        let mut server = launcher.next_server_end().await;

        let call = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call_tool("git_status", json!({})).await }
        });
        let (id, _, _) = server.next_request().await;

        server.send_line(response_line(&RequestId::Number(9999), Ok(json!({"content": []}))));
        server.send_line("this is not json".to_string());
        server.respond_text(&id, "clean");

        assert_eq!(call.await.unwrap().unwrap().joined_text(), "clean");
        assert_eq!(conn.state(), ConnectionState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_connection_running() {
        let launcher = Arc::new(MemoryLauncher::new().manual("git"));
        let conn = Arc::new(McpConnection::with_launcher(
            descriptor("git").with_call_timeout_secs(1),
            Arc::clone(&launcher) as Arc<dyn TransportLauncher>,
        ));
        conn.start().await.unwrap();
        let mut server = launcher.next_server_end().await;

        let started = tokio::time::Instant::now();
        let err = conn.call_tool("git_status", json!({})).await.unwrap_err();
        assert!(matches!(err, McpClientError::Timeout { timeout_secs: 1, .. }));
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(conn.pending_requests(), 0);
        assert_eq!(conn.state(), ConnectionState::Running);

        // The late response is dropped as unsolicited
        let (late_id, _, _) = server.next_request().await;
        server.respond_text(&late_id, "late");

        let call = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call_tool("git_status", json!({})).await }
        });
        let (id, _, _) = server.next_request().await;
        assert_ne!(id, late_id);
        server.respond_text(&id, "on time");
        assert_eq!(call.await.unwrap().unwrap().joined_text(), "on time");
    }

    #[tokio::test]
    async fn test_transport_death_fails_pending_and_marks_failed() {
        let launcher = Arc::new(MemoryLauncher::new().manual("git"));
        let conn = Arc::new(connection(&launcher, "git"));
        conn.start().await.unwrap();
        let mut server = launcher.next_server_end().await;
        let mut states = conn.subscribe_state();

        let call = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call_tool("git_status", json!({})).await }
        });
        server.next_request().await;
        server.exit("segfault");

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, McpClientError::TransportClosed { .. }));
        assert!(err.to_string().contains("segfault"));

        states
            .wait_for(|state| *state == ConnectionState::Failed)
            .await
            .unwrap();
        assert!(matches!(
            conn.call_tool("git_status", json!({})).await,
            Err(McpClientError::NotRunning { .. })
        ));

        // Explicit restart recovers
        conn.start().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Running);
        assert_eq!(launcher.launches("git"), 2);
    }

    #[tokio::test]
    async fn test_stop_fails_in_flight_calls() {
        let launcher = Arc::new(MemoryLauncher::new().manual("git"));
        let conn = Arc::new(connection(&launcher, "git"));
        conn.start().await.unwrap();
        let mut server = launcher.next_server_end().await;

        let call = tokio::spawn({
            let conn = Arc::clone(&conn);
            async move { conn.call_tool("git_status", json!({})).await }
        });
        server.next_request().await;

        conn.stop().await;
        assert_eq!(conn.state(), ConnectionState::Stopped);
        assert!(matches!(
            call.await.unwrap(),
            Err(McpClientError::TransportClosed { .. })
        ));
        assert_eq!(conn.pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_ids_are_never_reused_across_restarts() {
        let launcher = Arc::new(MemoryLauncher::new().manual("git"));
        let conn = Arc::new(connection(&launcher, "git"));

        let mut seen = Vec::new();
        for _ in 0..2 {
            conn.start().await.unwrap();
            let mut server = launcher.next_server_end().await;
            let call = tokio::spawn({
                let conn = Arc::clone(&conn);
                async move { conn.call_tool("git_status", json!({})).await }
            });
            let (id, _, _) = server.next_request().await;
            server.respond_text(&id, "ok");
            call.await.unwrap().unwrap();
            seen.push(id);
            conn.stop().await;
        }

        assert_ne!(seen[0], seen[1]);
    }
}
