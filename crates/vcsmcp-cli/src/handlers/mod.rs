//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(<port or context>, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call the executor or manager
//!   3. Format output for the terminal
//!
//! Operation handlers take `&dyn VcsExecutor` so they can be tested with a
//! mock; only fleet introspection (`status`, `tools`) needs the manager.

pub mod call;
pub mod git;
pub mod github;
pub mod gitlab;
pub mod jj;
pub mod status;
pub mod tools;

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::BTreeMap;

    use vcsmcp_core::{VcsExecutor, VcsOperation, VcsOperationResult};

    mockall::mock! {
        pub Executor {}

        #[async_trait::async_trait]
        impl VcsExecutor for Executor {
            async fn execute(&self, operation: VcsOperation) -> VcsOperationResult;
            async fn server_status(&self) -> BTreeMap<String, bool>;
        }
    }

    /// An executor that expects exactly one call to `tool` and answers with `content`.
    pub fn expect_tool(tool: &'static str, content: &'static str) -> MockExecutor {
        let mut executor = MockExecutor::new();
        executor
            .expect_execute()
            .withf(move |op| op.tool_name == tool)
            .times(1)
            .returning(move |op| VcsOperationResult::success(op.server_name, content));
        executor
    }
}
