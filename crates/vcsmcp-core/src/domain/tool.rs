//! MCP tool types.
//!
//! These mirror the `tools/list` and `tools/call` payloads on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool advertised by a server through `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

/// One item of a tool result's `content` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content kind (`text`, `image`, `resource`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ContentItem {
    /// A plain text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            data: None,
            mime_type: None,
        }
    }
}

/// Result of a `tools/call` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Set by the backend when the tool itself failed.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub const fn success(content: Vec<ContentItem>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: true,
        }
    }

    /// Text items joined by newlines, in order.
    pub fn joined_text(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n")
    }

    /// The first text item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.texts().next()
    }

    fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|item| item.text.as_deref())
    }
}
