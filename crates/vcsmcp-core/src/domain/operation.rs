//! Request/response DTOs crossing the manager's public boundary.
//!
//! Nothing above this boundary needs to know about JSON-RPC, process handles
//! or framing: callers build a `VcsOperation` and always get a
//! `VcsOperationResult` value back, never an error.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation addressed to a named server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsOperation {
    pub server_name: String,
    pub tool_name: String,
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
}

impl VcsOperation {
    pub fn new(server_name: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    /// Add an argument.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Add an argument only when a value is present.
    #[must_use]
    pub fn arg_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.arg(key, value),
            None => self,
        }
    }
}

/// Classification of a failed operation.
///
/// Used by adapters to render failures uniformly; the raw category is only
/// shown in verbose output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Spawn failure, process death, broken pipe.
    Transport,
    /// The per-call timeout elapsed.
    Timeout,
    /// Malformed messages or JSON-RPC error responses.
    Protocol,
    /// The backend reported `isError`.
    Tool,
    /// Unknown or disabled server.
    Configuration,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Tool => "tool",
            Self::Configuration => "configuration",
        };
        f.write_str(label)
    }
}

/// Normalized outcome of a `VcsOperation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsOperationResult {
    pub server_name: String,
    pub success: bool,
    /// Joined text content on success, empty on failure.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    /// JSON-RPC error code, when the failure carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl VcsOperationResult {
    pub fn success(server_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            success: true,
            content: content.into(),
            error: None,
            category: None,
            code: None,
        }
    }

    pub fn failure(
        server_name: impl Into<String>,
        category: FailureCategory,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".to_string();
        }

        Self {
            server_name: server_name.into(),
            success: false,
            content: String::new(),
            error: Some(message),
            category: Some(category),
            code: None,
        }
    }

    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }
}
