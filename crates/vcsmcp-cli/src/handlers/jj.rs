//! Jujutsu command handlers.

use vcsmcp_core::VcsExecutor;
use vcsmcp_mcp::VcsOperations;

use crate::error::CliError;
use crate::presentation::print_result;
use crate::vcs_commands::JjCommand;

/// Run one jj subcommand through the executor.
pub async fn execute(
    executor: &dyn VcsExecutor,
    command: JjCommand,
    verbose: bool,
) -> Result<(), CliError> {
    let result = match command {
        JjCommand::Status { repo } => executor.jujutsu_status(&repo).await,
        JjCommand::Log { repo, limit } => executor.jujutsu_log(&repo, limit).await,
        JjCommand::Describe { repo, message } => {
            executor.jujutsu_describe(&repo, &message).await
        }
        JjCommand::New { repo, message } => {
            executor.jujutsu_new(&repo, message.as_deref()).await
        }
    };

    print_result(&result, verbose)
}
