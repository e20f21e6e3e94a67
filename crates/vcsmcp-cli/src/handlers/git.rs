//! Git command handlers.

use vcsmcp_core::VcsExecutor;
use vcsmcp_mcp::VcsOperations;

use crate::error::CliError;
use crate::presentation::print_result;
use crate::vcs_commands::GitCommand;

/// Run one git subcommand through the executor.
pub async fn execute(
    executor: &dyn VcsExecutor,
    command: GitCommand,
    verbose: bool,
) -> Result<(), CliError> {
    let result = match command {
        GitCommand::Status { repo } => executor.git_status(&repo).await,
        GitCommand::Diff {
            repo,
            staged,
            target,
        } => match (staged, target) {
            (true, _) => executor.git_diff_staged(&repo).await,
            (false, Some(target)) => executor.git_diff(&repo, &target).await,
            (false, None) => executor.git_diff_unstaged(&repo).await,
        },
        GitCommand::Add { repo, files } => executor.git_add(&repo, &files).await,
        GitCommand::Commit { repo, message } => executor.git_commit(&repo, &message).await,
        GitCommand::Log { repo, max_count } => executor.git_log(&repo, max_count).await,
        GitCommand::Branch { repo, name, base } => {
            executor
                .git_create_branch(&repo, &name, base.as_deref())
                .await
        }
        GitCommand::Checkout { repo, branch } => executor.git_checkout(&repo, &branch).await,
        GitCommand::Show { repo, revision } => executor.git_show(&repo, &revision).await,
    };

    print_result(&result, verbose)
}
