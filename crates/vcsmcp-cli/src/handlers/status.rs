//! Status command handler.

use vcsmcp_core::VcsExecutor;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_status_table;

/// Start every enabled server and print the fleet table.
///
/// Disabled servers are listed but never launched. A server that fails to
/// start shows as `failed`; the others are unaffected.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let manager = ctx.manager();

    manager.start_all_servers().await;
    let states = manager.server_states().await;

    print!("{}", format_status_table(manager.registry().iter(), &states));
    println!();
    println!(
        "{} of {} server(s) active",
        active_count(ctx.executor()).await,
        manager.registry().len()
    );
    Ok(())
}

async fn active_count(executor: &dyn VcsExecutor) -> usize {
    executor
        .server_status()
        .await
        .values()
        .filter(|&&active| active)
        .count()
}
