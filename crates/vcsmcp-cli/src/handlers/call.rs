//! Generic tool call handler.

use std::collections::HashMap;

use serde_json::Value;
use vcsmcp_core::{VcsExecutor, VcsOperation};

use crate::error::CliError;
use crate::presentation::print_result;

/// Parse `--args` into tool arguments. Only JSON objects are accepted.
pub fn parse_arguments(raw: &str) -> Result<HashMap<String, Value>, CliError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(other) => Err(CliError::Arguments(format!(
            "--args must be a JSON object, got: {other}"
        ))),
        Err(e) => Err(CliError::Arguments(format!("--args is not valid JSON: {e}"))),
    }
}

/// Call `tool` on `server` with raw JSON arguments.
pub async fn execute(
    executor: &dyn VcsExecutor,
    server: &str,
    tool: &str,
    raw_args: &str,
    verbose: bool,
) -> Result<(), CliError> {
    let mut operation = VcsOperation::new(server, tool);
    operation.arguments = parse_arguments(raw_args)?;

    let result = executor.execute(operation).await;
    print_result(&result, verbose)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vcsmcp_core::{FailureCategory, VcsOperationResult};

    use super::*;
    use crate::handlers::mock::MockExecutor;

    #[test]
    fn test_parse_arguments() {
        let args = parse_arguments(r#"{"repo_path": ".", "max_count": 3}"#).unwrap();
        assert_eq!(args["max_count"], json!(3));

        assert!(matches!(parse_arguments("[1]"), Err(CliError::Arguments(_))));
        assert!(matches!(parse_arguments("{oops"), Err(CliError::Arguments(_))));
    }

    #[tokio::test]
    async fn test_call_forwards_operation() {
        let mut executor = MockExecutor::new();
        executor
            .expect_execute()
            .withf(|op| {
                op.server_name == "git"
                    && op.tool_name == "git_log"
                    && op.arguments.get("max_count") == Some(&json!(3))
            })
            .times(1)
            .returning(|op| VcsOperationResult::success(op.server_name, "abc123 Initial commit"));

        execute(&executor, "git", "git_log", r#"{"max_count": 3}"#, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_call_failure_becomes_error() {
        let mut executor = MockExecutor::new();
        executor.expect_execute().times(1).returning(|op| {
            VcsOperationResult::failure(op.server_name, FailureCategory::Timeout, "timed out")
        });

        let err = execute(&executor, "git", "git_log", "{}", true).await.unwrap_err();
        assert!(err.to_string().contains("category: timeout"));
    }

    #[tokio::test]
    async fn test_bad_args_never_reach_executor() {
        let executor = MockExecutor::new();
        let err = execute(&executor, "git", "git_log", "42", false).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
