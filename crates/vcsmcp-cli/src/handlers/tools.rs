//! Tools command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_tools;

/// Start `server` and list its tools.
pub async fn execute(ctx: &CliContext, server: &str) -> Result<(), CliError> {
    let manager = ctx.manager();

    if !manager.start_server(server).await? {
        return Err(CliError::Unavailable(format!(
            "server '{server}' is disabled (enable it with --enable {server})"
        )));
    }

    let tools = manager.list_available_tools(server).await?;
    print!("{}", format_tools(server, &tools));
    Ok(())
}
