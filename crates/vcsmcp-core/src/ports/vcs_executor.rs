//! Executor port for normalized VCS operations.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{VcsOperation, VcsOperationResult};

/// Executes `VcsOperation`s against whatever backs them.
///
/// Implementations must be exception-free: every failure is reported as a
/// `VcsOperationResult` with `success == false` and a non-empty `error`.
#[async_trait]
pub trait VcsExecutor: Send + Sync {
    /// Execute one operation.
    async fn execute(&self, operation: VcsOperation) -> VcsOperationResult;

    /// Server name → whether it is currently active. Never starts anything.
    async fn server_status(&self) -> BTreeMap<String, bool>;
}
