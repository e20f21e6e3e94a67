//! In-memory transports for connection and manager tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use vcsmcp_core::ServerDescriptor;

use crate::protocol::{self, ErrorInfo, Message, RequestId, error_codes};
use crate::transport::{
    ExitInfo, Transport, TransportError, TransportEvent, TransportHandle, TransportLauncher,
};

/// Produces the stdout lines a server writes in reply to one message.
pub type Responder = Arc<dyn Fn(&Message) -> Vec<String> + Send + Sync>;

pub fn response_line(id: &RequestId, outcome: Result<Value, ErrorInfo>) -> String {
    Message::response(id.clone(), outcome).to_value().to_string()
}

fn text_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{"type": "text", "text": text}],
        "isError": is_error,
    })
}

/// Answers `tools/call` with `"<tool> ok"` and `tools/list` with one tool.
pub fn echo_responder() -> Responder {
    Arc::new(|message: &Message| {
        let Message::Request { id, method, params } = message else {
            return Vec::new();
        };
        let outcome = match method.as_str() {
            "tools/call" => {
                let tool = params
                    .as_ref()
                    .and_then(|p| p.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Ok(text_result(&format!("{tool} ok"), false))
            }
            "tools/list" => Ok(json!({
                "tools": [{"name": "git_status", "description": "Show status"}]
            })),
            other => Err(ErrorInfo::new(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        };
        vec![response_line(id, outcome)]
    })
}

/// Answers every `tools/call` with an `isError` result.
pub fn tool_error_responder(text: &'static str) -> Responder {
    Arc::new(move |message: &Message| match message {
        Message::Request { id, .. } => vec![response_line(id, Ok(text_result(text, true)))],
        _ => Vec::new(),
    })
}

/// The far side of a manually driven transport.
pub struct ServerEnd {
    requests: mpsc::UnboundedReceiver<Message>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl ServerEnd {
    /// Wait for the next request the client sends.
    pub async fn next_request(&mut self) -> (RequestId, String, Option<Value>) {
        loop {
            match self.requests.recv().await {
                Some(Message::Request { id, method, params }) => return (id, method, params),
                Some(_) => {}
                None => panic!("client transport dropped"),
            }
        }
    }

    pub fn send_line(&self, line: String) {
        let _ = self.events.send(TransportEvent::Line(line));
    }

    pub fn respond_text(&self, id: &RequestId, text: &str) {
        self.send_line(response_line(id, Ok(text_result(text, false))));
    }

    /// Simulate the process dying.
    pub fn exit(&self, stderr: &str) {
        let _ = self.events.send(TransportEvent::Closed(ExitInfo {
            code: None,
            stderr: stderr.to_string(),
        }));
    }
}

enum Script {
    Respond(Responder),
    Manual,
    Fail,
}

struct MemoryTransport {
    mode: Mode,
    events: mpsc::UnboundedSender<TransportEvent>,
    closed: AtomicBool,
    server_name: String,
}

enum Mode {
    Respond(Responder),
    Manual(mpsc::UnboundedSender<Message>),
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) || self.events.is_closed() {
            return Err(TransportError::Closed {
                server: self.server_name.clone(),
                reason: "process has exited".to_string(),
            });
        }

        let message = protocol::decode(frame).map_err(|e| TransportError::Closed {
            server: self.server_name.clone(),
            reason: format!("client wrote an invalid frame: {e}"),
        })?;

        match &self.mode {
            Mode::Respond(responder) => {
                for line in responder(&message) {
                    let _ = self.events.send(TransportEvent::Line(line));
                }
            }
            Mode::Manual(requests) => {
                let _ = requests.send(message);
            }
        }
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.events.send(TransportEvent::Closed(ExitInfo::default()));
        }
    }
}

/// Launcher whose servers live in memory.
///
/// Servers answer with `echo_responder` unless scripted otherwise.
pub struct MemoryLauncher {
    scripts: HashMap<String, Script>,
    launches: Mutex<HashMap<String, usize>>,
    ends_tx: mpsc::UnboundedSender<ServerEnd>,
    ends_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ServerEnd>>,
    spawned: Mutex<HashSet<String>>,
}

impl MemoryLauncher {
    pub fn new() -> Self {
        let (ends_tx, ends_rx) = mpsc::unbounded_channel();
        Self {
            scripts: HashMap::new(),
            launches: Mutex::new(HashMap::new()),
            ends_tx,
            ends_rx: tokio::sync::Mutex::new(ends_rx),
            spawned: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn failing(mut self, name: &str) -> Self {
        self.scripts.insert(name.to_string(), Script::Fail);
        self
    }

    #[must_use]
    pub fn manual(mut self, name: &str) -> Self {
        self.scripts.insert(name.to_string(), Script::Manual);
        self
    }

    #[must_use]
    pub fn with_responder(mut self, name: &str, responder: Responder) -> Self {
        self.scripts.insert(name.to_string(), Script::Respond(responder));
        self
    }

    /// Number of launch attempts for `name`, including failed ones.
    pub fn launches(&self, name: &str) -> usize {
        self.launches.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// Whether `name` was ever launched successfully.
    pub fn spawned(&self, name: &str) -> bool {
        self.spawned.lock().unwrap().contains(name)
    }

    /// The server end of the next manual transport.
    pub async fn next_server_end(&self) -> ServerEnd {
        self.ends_rx
            .lock()
            .await
            .recv()
            .await
            .expect("launcher dropped")
    }
}

#[async_trait]
impl TransportLauncher for MemoryLauncher {
    async fn launch(
        &self,
        descriptor: &ServerDescriptor,
    ) -> Result<TransportHandle, TransportError> {
        let name = descriptor.name.clone();
        *self.launches.lock().unwrap().entry(name.clone()).or_default() += 1;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mode = match self.scripts.get(&name) {
            Some(Script::Fail) => {
                return Err(TransportError::SpawnFailed {
                    server: name,
                    reason: "exited during startup (process exited with code 1)".to_string(),
                });
            }
            Some(Script::Manual) => {
                let (requests_tx, requests_rx) = mpsc::unbounded_channel();
                let _ = self.ends_tx.send(ServerEnd {
                    requests: requests_rx,
                    events: events_tx.clone(),
                });
                Mode::Manual(requests_tx)
            }
            Some(Script::Respond(responder)) => Mode::Respond(Arc::clone(responder)),
            None => Mode::Respond(echo_responder()),
        };

        self.spawned.lock().unwrap().insert(name.clone());

        Ok(TransportHandle {
            transport: Arc::new(MemoryTransport {
                mode,
                events: events_tx,
                closed: AtomicBool::new(false),
                server_name: name,
            }),
            events: events_rx,
        })
    }
}
