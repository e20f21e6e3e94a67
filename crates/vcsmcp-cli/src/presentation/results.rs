//! Rendering of operation results.

use vcsmcp_core::VcsOperationResult;

use crate::error::CliError;

/// Print a successful result's content to stdout, or turn a failure into
/// a `CliError` for the caller to report.
pub fn print_result(result: &VcsOperationResult, verbose: bool) -> Result<(), CliError> {
    if !result.success {
        return Err(CliError::Operation(format_failure(result, verbose)));
    }

    if result.content.is_empty() {
        println!("[{}] ok", result.server_name);
    } else {
        println!("{}", result.content);
    }
    Ok(())
}

/// One-line failure message. Categories and codes only show with `verbose`.
pub fn format_failure(result: &VcsOperationResult, verbose: bool) -> String {
    let message = result.error.as_deref().unwrap_or("unknown error");
    let mut line = format!("[{}] {message}", result.server_name);

    if verbose {
        let mut details = Vec::new();
        if let Some(category) = result.category {
            details.push(format!("category: {category}"));
        }
        if let Some(code) = result.code {
            details.push(format!("code: {code}"));
        }
        if !details.is_empty() {
            line.push_str(&format!(" ({})", details.join(", ")));
        }
    }

    line
}
