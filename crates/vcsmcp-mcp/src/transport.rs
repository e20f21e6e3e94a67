//! Stdio transport for tool server child processes.
//!
//! A transport owns exactly one child process. It forwards frames to the
//! child's stdin and delivers every complete stdout line as a
//! `TransportEvent::Line`, followed by exactly one `TransportEvent::Closed`
//! once stdout reaches EOF or the process exits, whichever comes first.
//! Process exit is observed by a supervisor task awaiting the child and
//! published on a `watch` channel, so nothing polls the process handle.

use std::collections::VecDeque;
use std::fmt;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use vcsmcp_core::ServerDescriptor;

use crate::shutdown::shutdown_child;

/// How long a freshly spawned process must survive to count as started.
const STARTUP_GRACE: Duration = Duration::from_millis(150);

/// Grace period between SIGTERM and SIGKILL on close.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// How long to wait for the exit status after stdout reaches EOF.
const EXIT_WAIT: Duration = Duration::from_secs(1);

/// How long to keep reading stdout after the process has exited.
const STDOUT_DRAIN: Duration = Duration::from_millis(200);

/// How long to wait for the stderr pump to drain after exit.
const STDERR_DRAIN: Duration = Duration::from_millis(200);

/// Number of stderr lines retained for error reports.
const STDERR_TAIL_LINES: usize = 64;

/// Errors raised by a transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The process could not be spawned or exited during the startup grace window.
    #[error("failed to spawn server '{server}': {reason}")]
    SpawnFailed { server: String, reason: String },

    /// The process has exited or its stdin is gone.
    #[error("transport closed for server '{server}': {reason}")]
    Closed { server: String, reason: String },
}

/// How a server process ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, `None` when killed by a signal or unknown.
    pub code: Option<i32>,
    /// Tail of the captured stderr.
    pub stderr: String,
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "process exited with code {code}")?,
            None => write!(f, "process exited")?,
        }
        if !self.stderr.is_empty() {
            write!(f, "; stderr: {}", self.stderr)?;
        }
        Ok(())
    }
}

/// Events delivered from a transport to its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One complete, non-empty stdout line (without the newline).
    Line(String),
    /// The process is gone. Always the last event.
    Closed(ExitInfo),
}

/// Writing half of a transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one encoded frame to the server.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Terminate the server. Idempotent.
    async fn close(&self);
}

/// A launched transport and the stream of events it produces.
pub struct TransportHandle {
    pub transport: Arc<dyn Transport>,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Creates transports for descriptors.
///
/// Connections are generic over this seam so they can be driven by
/// something other than a real child process.
#[async_trait]
pub trait TransportLauncher: Send + Sync {
    async fn launch(
        &self,
        descriptor: &ServerDescriptor,
    ) -> Result<TransportHandle, TransportError>;
}

/// Launches servers as stdio child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioLauncher;

#[async_trait]
impl TransportLauncher for StdioLauncher {
    async fn launch(
        &self,
        descriptor: &ServerDescriptor,
    ) -> Result<TransportHandle, TransportError> {
        let (transport, events) = StdioTransport::spawn(descriptor).await?;
        Ok(TransportHandle {
            transport: Arc::new(transport),
            events,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessState {
    Running,
    Exited(Option<i32>),
}

impl ProcessState {
    const fn has_exited(&self) -> bool {
        matches!(self, Self::Exited(_))
    }

    const fn exit_code(self) -> Option<i32> {
        match self {
            Self::Running => None,
            Self::Exited(code) => code,
        }
    }
}

/// Bounded tail of a process's stderr.
struct StderrTail {
    lines: Mutex<VecDeque<String>>,
    done: watch::Sender<bool>,
}

impl StderrTail {
    fn new() -> Self {
        Self {
            lines: Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)),
            done: watch::Sender::new(false),
        }
    }

    fn push(&self, line: String) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() == STDERR_TAIL_LINES {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Drain the captured lines.
    fn take(&self) -> String {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.drain(..).collect::<Vec<_>>().join("\n")
    }

    async fn wait_drained(&self, limit: Duration) {
        let mut done = self.done.subscribe();
        let _ = timeout(limit, done.wait_for(|finished| *finished)).await;
    }
}

/// Transport over a child process's stdin/stdout.
pub struct StdioTransport {
    server_name: String,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    exit_rx: watch::Receiver<ProcessState>,
    stderr: Arc<StderrTail>,
}

impl StdioTransport {
    /// Spawn the descriptor's process and start its I/O pumps.
    ///
    /// Fails if the command cannot be spawned or the process exits within
    /// the startup grace window.
    pub async fn spawn(
        descriptor: &ServerDescriptor,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>), TransportError> {
        let server_name = descriptor.name.clone();
        let spawn_failed = |reason: String| TransportError::SpawnFailed {
            server: server_name.clone(),
            reason,
        };

        descriptor.validate().map_err(spawn_failed)?;

        let mut command = Command::new(&descriptor.command);
        command
            .args(&descriptor.args)
            .envs(&descriptor.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            spawn_failed(format!(
                "'{}': {e}\nArgs: {:?}",
                descriptor.command, descriptor.args
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failed("failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed("failed to get stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| spawn_failed("failed to get stderr".to_string()))?;

        tracing::debug!(
            server_name = %server_name,
            pid = ?child.id(),
            command = %descriptor.command,
            "Spawned server process"
        );

        let (exit_tx, exit_rx) = watch::channel(ProcessState::Running);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let stderr_tail = Arc::new(StderrTail::new());

        tokio::spawn(supervise(server_name.clone(), child, shutdown_rx, exit_tx));
        tokio::spawn(pump_stderr(
            server_name.clone(),
            stderr,
            Arc::clone(&stderr_tail),
        ));
        tokio::spawn(pump_stdout(
            server_name.clone(),
            stdout,
            exit_rx.clone(),
            Arc::clone(&stderr_tail),
            events_tx,
        ));

        let transport = Self {
            server_name: server_name.clone(),
            stdin: tokio::sync::Mutex::new(Some(stdin)),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            exit_rx,
            stderr: stderr_tail,
        };

        // A server that dies during startup (bad args, missing module) is a spawn failure
        let early_exit = timeout(STARTUP_GRACE, wait_exited(transport.exit_rx.clone())).await;
        if let Ok(code) = early_exit {
            transport.stderr.wait_drained(STDERR_DRAIN).await;
            let info = ExitInfo {
                code,
                stderr: transport.stderr.take(),
            };
            return Err(spawn_failed(format!("exited during startup ({info})")));
        }

        Ok((transport, events_rx))
    }

    fn has_exited(&self) -> bool {
        self.exit_rx.borrow().has_exited()
    }

    /// Build a `Closed` error carrying whatever stderr was captured.
    fn closed_error(&self, reason: impl Into<String>) -> TransportError {
        let mut reason = reason.into();
        let stderr = self.stderr.take();
        if !stderr.is_empty() {
            reason = format!("{reason}; stderr: {stderr}");
        }
        TransportError::Closed {
            server: self.server_name.clone(),
            reason,
        }
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        if self.has_exited() {
            return Err(self.closed_error("process has exited"));
        }

        let mut guard = self.stdin.lock().await;
        let Some(stdin) = guard.as_mut() else {
            return Err(self.closed_error("transport was closed"));
        };

        stdin
            .write_all(frame)
            .await
            .map_err(|e| self.closed_error(format!("failed to write to stdin: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| self.closed_error(format!("failed to flush stdin: {e}")))?;

        Ok(())
    }

    async fn close(&self) {
        // Drop stdin so well-behaved servers see EOF
        self.stdin.lock().await.take();

        let shutdown = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }

        let mut exit_rx = self.exit_rx.clone();
        let _ = exit_rx.wait_for(ProcessState::has_exited).await;
    }
}

/// Own the child: wait for it to exit or for a shutdown request.
///
/// Dropping the transport drops `shutdown_rx`, which also shuts the child down.
async fn supervise(
    server_name: String,
    mut child: Child,
    shutdown_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<ProcessState>,
) {
    enum Wake {
        Exited(std::io::Result<std::process::ExitStatus>),
        Shutdown,
    }

    let wake = tokio::select! {
        status = child.wait() => Wake::Exited(status),
        _ = shutdown_rx => Wake::Shutdown,
    };

    let status = match wake {
        Wake::Exited(status) => status,
        Wake::Shutdown => shutdown_child(&mut child, SHUTDOWN_GRACE).await,
    };

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            tracing::warn!(server_name = %server_name, error = %e, "Failed to reap server process");
            None
        }
    };

    tracing::debug!(server_name = %server_name, exit_code = ?code, "Server process exited");
    exit_tx.send_replace(ProcessState::Exited(code));
}

/// Resolves with the exit code once the supervisor has reaped the child.
async fn wait_exited(mut exit_rx: watch::Receiver<ProcessState>) -> Option<i32> {
    exit_rx
        .wait_for(ProcessState::has_exited)
        .await
        .ok()
        .and_then(|state| state.exit_code())
}

/// Line splitter over a child's stdout.
///
/// Bytes of an unfinished line stay in `buf`, so a read cancelled by
/// `select!` loses nothing.
struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// Next non-empty line without its terminator, `None` at EOF.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 && self.buf.is_empty() {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.buf).trim().to_string();
            self.buf.clear();
            if !line.is_empty() {
                return Ok(Some(line));
            }
            if read == 0 {
                return Ok(None);
            }
        }
    }
}

async fn pump_stdout(
    server_name: String,
    stdout: impl AsyncRead + Unpin,
    exit_rx: watch::Receiver<ProcessState>,
    stderr: Arc<StderrTail>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut lines = LineReader::new(stdout);
    let exited = wait_exited(exit_rx.clone());
    tokio::pin!(exited);

    let code = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if events.send(TransportEvent::Line(line)).is_err() {
                        // Connection is gone, nobody to deliver to
                        return;
                    }
                }
                eof_or_error => {
                    if let Err(e) = eof_or_error {
                        tracing::warn!(
                            server_name = %server_name,
                            error = %e,
                            "Failed to read server stdout"
                        );
                    }
                    break timeout(EXIT_WAIT, wait_exited(exit_rx.clone()))
                        .await
                        .unwrap_or(None);
                }
            },
            code = &mut exited => {
                // A descendant may still hold stdout open; deliver what is already written
                let drain = async {
                    while let Ok(Some(line)) = lines.next_line().await {
                        if events.send(TransportEvent::Line(line)).is_err() {
                            break;
                        }
                    }
                };
                let _ = timeout(STDOUT_DRAIN, drain).await;
                break code;
            }
        }
    };
    stderr.wait_drained(STDERR_DRAIN).await;

    let info = ExitInfo {
        code,
        stderr: stderr.take(),
    };
    let _ = events.send(TransportEvent::Closed(info));
}

async fn pump_stderr(server_name: String, stderr: impl AsyncRead + Unpin, tail: Arc<StderrTail>) {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                tracing::debug!(server_name = %server_name, line = %line, "Server stderr");
                tail.push(line);
            }
        }
    }

    tail.done.send_replace(true);
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(name: &str, script: &str) -> ServerDescriptor {
        ServerDescriptor::new(name, "sh", ["-c", script]).enabled(true)
    }

    #[tokio::test]
    async fn test_spawn_missing_command_fails() {
        let descriptor =
            ServerDescriptor::new("ghost", "/nonexistent/vcsmcp-server", Vec::<String>::new());
        let err = StdioTransport::spawn(&descriptor).await.err().unwrap();
        assert!(matches!(err, TransportError::SpawnFailed { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_immediate_exit_is_spawn_failure_with_stderr() {
        let descriptor = sh("broken", "echo 'missing module' >&2; exit 3");
        let err = StdioTransport::spawn(&descriptor).await.err().unwrap();
        let message = err.to_string();
        assert!(matches!(err, TransportError::SpawnFailed { .. }));
        assert!(message.contains("code 3"), "{message}");
        assert!(message.contains("missing module"), "{message}");
    }

    #[tokio::test]
    async fn test_lines_are_delivered_then_closed() {
        let descriptor = sh("echo", "cat");
        let (transport, mut events) = StdioTransport::spawn(&descriptor).await.unwrap();

        transport.send(b"{\"hello\":1}\n").await.unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event, TransportEvent::Line("{\"hello\":1}".to_string()));

        transport.close().await;
        loop {
            match events.recv().await {
                Some(TransportEvent::Closed(_)) => break,
                Some(TransportEvent::Line(_)) => {}
                None => panic!("event stream ended without Closed"),
            }
        }
    }

    #[tokio::test]
    async fn test_send_after_exit_is_closed() {
        let descriptor = sh("late", "sleep 0.3; echo bye >&2; exit 1");
        let (transport, mut events) = StdioTransport::spawn(&descriptor).await.unwrap();

        let Some(TransportEvent::Closed(info)) = events.recv().await else {
            panic!("expected Closed");
        };
        assert_eq!(info.code, Some(1));
        assert!(info.stderr.contains("bye"));

        let err = transport.send(b"{}\n").await.unwrap_err();
        assert!(matches!(err, TransportError::Closed { .. }));
    }

    #[tokio::test]
    async fn test_exit_is_reported_while_a_descendant_holds_stdout() {
        let descriptor = sh("orphaning", "sleep 20 & read l; echo bye >&2; exit 3");
        let (transport, mut events) = StdioTransport::spawn(&descriptor).await.unwrap();

        transport.send(b"{}\n").await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(3), events.recv())
            .await
            .expect("exit was not reported while stdout stayed open");

        match event {
            Some(TransportEvent::Closed(info)) => assert_eq!(info.code, Some(3)),
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let descriptor = sh("idle", "cat > /dev/null");
        let (transport, _events) = StdioTransport::spawn(&descriptor).await.unwrap();

        transport.close().await;
        transport.close().await;
        assert!(transport.has_exited());
    }
}
