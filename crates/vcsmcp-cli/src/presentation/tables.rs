//! Table formatting utilities for CLI output.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use vcsmcp_core::{McpTool, ServerDescriptor};
use vcsmcp_mcp::ConnectionState;

/// Truncates a string to a maximum number of characters, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use vcsmcp_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Server table: name, enabled flag, connection state, launch command.
pub fn format_status_table<'a>(
    servers: impl IntoIterator<Item = &'a ServerDescriptor>,
    states: &BTreeMap<String, ConnectionState>,
) -> String {
    let mut out = format!("{:<10} {:<8} {:<9} {}\n", "SERVER", "ENABLED", "STATE", "COMMAND");
    out.push_str(&"-".repeat(60));
    out.push('\n');

    for descriptor in servers {
        let state = states
            .get(&descriptor.name)
            .copied()
            .unwrap_or(ConnectionState::Stopped);
        let command = format!("{} {}", descriptor.command, descriptor.args.join(" "));
        let _ = writeln!(
            out,
            "{:<10} {:<8} {:<9} {}",
            truncate_string(&descriptor.name, 10),
            if descriptor.enabled { "yes" } else { "no" },
            state,
            truncate_string(command.trim_end(), 60),
        );
    }

    out
}

/// Tool list: one tool per line with its description.
pub fn format_tools(server: &str, tools: &[McpTool]) -> String {
    if tools.is_empty() {
        return format!("Server '{server}' exposes no tools.\n");
    }

    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    let mut out = format!("{} tool(s) on '{server}':\n", tools.len());
    for tool in tools {
        let description = tool.description.as_deref().unwrap_or("--");
        let _ = writeln!(out, "  {:<width$}  {}", tool.name, truncate_string(description, 80));
    }
    out
}
