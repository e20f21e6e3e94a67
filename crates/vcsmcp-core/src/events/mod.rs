//! Server lifecycle events.
//!
//! Emitted by the manager through the `EventEmitter` port so adapters can
//! log or display fleet changes without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lifecycle change for one tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VcsEvent {
    /// The server process is running and accepting calls.
    #[serde(rename_all = "camelCase")]
    ServerStarted {
        server_name: String,
        at: DateTime<Utc>,
    },

    /// The server was stopped on request.
    #[serde(rename_all = "camelCase")]
    ServerStopped {
        server_name: String,
        at: DateTime<Utc>,
    },

    /// The server could not be started.
    #[serde(rename_all = "camelCase")]
    ServerStartFailed {
        server_name: String,
        message: String,
        at: DateTime<Utc>,
    },

    /// The server is disabled and was not started.
    #[serde(rename_all = "camelCase")]
    ServerSkipped {
        server_name: String,
        at: DateTime<Utc>,
    },
}

impl VcsEvent {
    pub fn server_started(server_name: impl Into<String>) -> Self {
        Self::ServerStarted {
            server_name: server_name.into(),
            at: Utc::now(),
        }
    }

    pub fn server_stopped(server_name: impl Into<String>) -> Self {
        Self::ServerStopped {
            server_name: server_name.into(),
            at: Utc::now(),
        }
    }

    pub fn server_start_failed(server_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServerStartFailed {
            server_name: server_name.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn server_skipped(server_name: impl Into<String>) -> Self {
        Self::ServerSkipped {
            server_name: server_name.into(),
            at: Utc::now(),
        }
    }

    /// Name of the server this event concerns.
    pub fn server_name(&self) -> &str {
        match self {
            Self::ServerStarted { server_name, .. }
            | Self::ServerStopped { server_name, .. }
            | Self::ServerStartFailed { server_name, .. }
            | Self::ServerSkipped { server_name, .. } => server_name,
        }
    }
}
