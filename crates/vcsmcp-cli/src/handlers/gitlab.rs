//! GitLab command handlers.

use vcsmcp_core::VcsExecutor;
use vcsmcp_mcp::VcsOperations;

use crate::error::CliError;
use crate::presentation::print_result;
use crate::vcs_commands::GitLabCommand;

/// Run one GitLab subcommand through the executor.
pub async fn execute(
    executor: &dyn VcsExecutor,
    command: GitLabCommand,
    verbose: bool,
) -> Result<(), CliError> {
    let result = match command {
        GitLabCommand::Issue {
            project,
            title,
            description,
        } => {
            executor
                .gitlab_create_issue(&project, &title, description.as_deref())
                .await
        }
        GitLabCommand::Mr {
            project,
            title,
            source,
            target,
            description,
        } => {
            executor
                .gitlab_create_merge_request(
                    &project,
                    &title,
                    &source,
                    &target,
                    description.as_deref(),
                )
                .await
        }
    };

    print_result(&result, verbose)
}
