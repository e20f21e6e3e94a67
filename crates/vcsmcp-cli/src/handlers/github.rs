//! GitHub command handlers.

use vcsmcp_core::VcsExecutor;
use vcsmcp_mcp::VcsOperations;

use crate::error::CliError;
use crate::presentation::print_result;
use crate::vcs_commands::GitHubCommand;

/// Split `owner/repo` into its two halves.
pub fn split_repo(slug: &str) -> Result<(&str, &str), CliError> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(CliError::Arguments(format!(
            "expected repository as owner/repo, got '{slug}'"
        ))),
    }
}

/// Run one GitHub subcommand through the executor.
pub async fn execute(
    executor: &dyn VcsExecutor,
    command: GitHubCommand,
    verbose: bool,
) -> Result<(), CliError> {
    let result = match command {
        GitHubCommand::Issue { repo, title, body } => {
            let (owner, repo) = split_repo(&repo)?;
            executor
                .github_create_issue(owner, repo, &title, body.as_deref())
                .await
        }
        GitHubCommand::Pr {
            repo,
            title,
            head,
            base,
            body,
        } => {
            let (owner, repo) = split_repo(&repo)?;
            executor
                .github_create_pull_request(owner, repo, &title, &head, &base, body.as_deref())
                .await
        }
        GitHubCommand::Issues { repo, state } => {
            let (owner, repo) = split_repo(&repo)?;
            executor
                .github_list_issues(owner, repo, state.as_deref())
                .await
        }
    };

    print_result(&result, verbose)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vcsmcp_core::{FailureCategory, VcsOperationResult};

    use super::*;
    use crate::handlers::mock::MockExecutor;

    #[test]
    fn test_split_repo() {
        assert_eq!(split_repo("octo/hello").unwrap(), ("octo", "hello"));
        assert!(split_repo("hello").is_err());
        assert!(split_repo("/hello").is_err());
        assert!(split_repo("a/b/c").is_err());
    }

    #[tokio::test]
    async fn test_pull_request_arguments() {
        let mut executor = MockExecutor::new();
        executor
            .expect_execute()
            .withf(|op| {
                op.server_name == "github"
                    && op.tool_name == "create_pull_request"
                    && op.arguments.get("owner") == Some(&json!("octo"))
                    && op.arguments.get("repo") == Some(&json!("hello"))
                    && op.arguments.get("head") == Some(&json!("feature"))
                    && op.arguments.get("base") == Some(&json!("main"))
            })
            .times(1)
            .returning(|op| VcsOperationResult::success(op.server_name, "PR #7 created"));

        let command = GitHubCommand::Pr {
            repo: "octo/hello".into(),
            title: "Add feature".into(),
            head: "feature".into(),
            base: "main".into(),
            body: None,
        };
        execute(&executor, command, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_server_failure_surfaces() {
        let mut executor = MockExecutor::new();
        executor.expect_execute().times(1).returning(|op| {
            VcsOperationResult::failure(
                op.server_name,
                FailureCategory::Configuration,
                "server 'github' not available: server is disabled",
            )
        });

        let command = GitHubCommand::Issues {
            repo: "octo/hello".into(),
            state: None,
        };
        let err = execute(&executor, command, false).await.unwrap_err();
        assert!(err.to_string().starts_with("[github]"));
    }

    #[tokio::test]
    async fn test_bad_slug_never_reaches_executor() {
        let executor = MockExecutor::new();
        let command = GitHubCommand::Issue {
            repo: "nope".into(),
            title: "t".into(),
            body: None,
        };
        let err = execute(&executor, command, false).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
