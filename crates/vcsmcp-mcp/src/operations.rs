//! Typed builders for the operations each backend understands.
//!
//! Builders are pure: they only assemble a `VcsOperation` with the tool name
//! and argument names the backend server expects. The `VcsOperations`
//! extension trait runs them through any `VcsExecutor`.

use async_trait::async_trait;
use vcsmcp_core::{VcsExecutor, VcsOperationResult};

/// Git backend (`git_*` tools).
pub mod git {
    use vcsmcp_core::{Backend, VcsOperation};

    fn op(tool: &str, repo_path: &str) -> VcsOperation {
        VcsOperation::new(Backend::Git.as_str(), tool).arg("repo_path", repo_path)
    }

    pub fn status(repo_path: &str) -> VcsOperation {
        op("git_status", repo_path)
    }

    pub fn diff_unstaged(repo_path: &str) -> VcsOperation {
        op("git_diff_unstaged", repo_path)
    }

    pub fn diff_staged(repo_path: &str) -> VcsOperation {
        op("git_diff_staged", repo_path)
    }

    /// Diff the working tree against `target` (branch or commit).
    pub fn diff(repo_path: &str, target: &str) -> VcsOperation {
        op("git_diff", repo_path).arg("target", target)
    }

    pub fn add(repo_path: &str, files: &[String]) -> VcsOperation {
        op("git_add", repo_path).arg("files", files.to_vec())
    }

    pub fn commit(repo_path: &str, message: &str) -> VcsOperation {
        op("git_commit", repo_path).arg("message", message)
    }

    pub fn log(repo_path: &str, max_count: u32) -> VcsOperation {
        op("git_log", repo_path).arg("max_count", max_count)
    }

    pub fn create_branch(
        repo_path: &str,
        branch_name: &str,
        base_branch: Option<&str>,
    ) -> VcsOperation {
        op("git_create_branch", repo_path)
            .arg("branch_name", branch_name)
            .arg_opt("base_branch", base_branch)
    }

    pub fn checkout(repo_path: &str, branch_name: &str) -> VcsOperation {
        op("git_checkout", repo_path).arg("branch_name", branch_name)
    }

    pub fn show(repo_path: &str, revision: &str) -> VcsOperation {
        op("git_show", repo_path).arg("revision", revision)
    }
}

/// GitHub backend.
pub mod github {
    use vcsmcp_core::{Backend, VcsOperation};

    fn op(tool: &str, owner: &str, repo: &str) -> VcsOperation {
        VcsOperation::new(Backend::GitHub.as_str(), tool)
            .arg("owner", owner)
            .arg("repo", repo)
    }

    pub fn create_issue(owner: &str, repo: &str, title: &str, body: Option<&str>) -> VcsOperation {
        op("create_issue", owner, repo)
            .arg("title", title)
            .arg_opt("body", body)
    }

    pub fn create_pull_request(
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> VcsOperation {
        op("create_pull_request", owner, repo)
            .arg("title", title)
            .arg("head", head)
            .arg("base", base)
            .arg_opt("body", body)
    }

    /// `state` is `open`, `closed` or `all`; the server defaults to `open`.
    pub fn list_issues(owner: &str, repo: &str, state: Option<&str>) -> VcsOperation {
        op("list_issues", owner, repo).arg_opt("state", state)
    }
}

/// GitLab backend. Projects are addressed by id or `namespace/path`.
pub mod gitlab {
    use vcsmcp_core::{Backend, VcsOperation};

    fn op(tool: &str, project_id: &str) -> VcsOperation {
        VcsOperation::new(Backend::GitLab.as_str(), tool).arg("project_id", project_id)
    }

    pub fn create_issue(project_id: &str, title: &str, description: Option<&str>) -> VcsOperation {
        op("create_issue", project_id)
            .arg("title", title)
            .arg_opt("description", description)
    }

    pub fn create_merge_request(
        project_id: &str,
        title: &str,
        source_branch: &str,
        target_branch: &str,
        description: Option<&str>,
    ) -> VcsOperation {
        op("create_merge_request", project_id)
            .arg("title", title)
            .arg("source_branch", source_branch)
            .arg("target_branch", target_branch)
            .arg_opt("description", description)
    }
}

/// Jujutsu backend (`jj_*` tools).
pub mod jujutsu {
    use vcsmcp_core::{Backend, VcsOperation};

    fn op(tool: &str, repo_path: &str) -> VcsOperation {
        VcsOperation::new(Backend::Jujutsu.as_str(), tool).arg("repo_path", repo_path)
    }

    pub fn status(repo_path: &str) -> VcsOperation {
        op("jj_status", repo_path)
    }

    pub fn log(repo_path: &str, limit: Option<u32>) -> VcsOperation {
        op("jj_log", repo_path).arg_opt("limit", limit)
    }

    pub fn describe(repo_path: &str, message: &str) -> VcsOperation {
        op("jj_describe", repo_path).arg("message", message)
    }

    /// Start a new change on top of the working copy.
    pub fn new(repo_path: &str, message: Option<&str>) -> VcsOperation {
        op("jj_new", repo_path).arg_opt("message", message)
    }
}

/// Typed convenience wrappers for every executor.
///
/// These add nothing beyond ergonomics: each one builds an operation and
/// hands it to `VcsExecutor::execute`.
#[async_trait]
pub trait VcsOperations: VcsExecutor {
    async fn git_status(&self, repo_path: &str) -> VcsOperationResult {
        self.execute(git::status(repo_path)).await
    }

    async fn git_diff_unstaged(&self, repo_path: &str) -> VcsOperationResult {
        self.execute(git::diff_unstaged(repo_path)).await
    }

    async fn git_diff_staged(&self, repo_path: &str) -> VcsOperationResult {
        self.execute(git::diff_staged(repo_path)).await
    }

    async fn git_diff(&self, repo_path: &str, target: &str) -> VcsOperationResult {
        self.execute(git::diff(repo_path, target)).await
    }

    async fn git_add(&self, repo_path: &str, files: &[String]) -> VcsOperationResult {
        self.execute(git::add(repo_path, files)).await
    }

    async fn git_commit(&self, repo_path: &str, message: &str) -> VcsOperationResult {
        self.execute(git::commit(repo_path, message)).await
    }

    async fn git_log(&self, repo_path: &str, max_count: u32) -> VcsOperationResult {
        self.execute(git::log(repo_path, max_count)).await
    }

    async fn git_create_branch(
        &self,
        repo_path: &str,
        branch_name: &str,
        base_branch: Option<&str>,
    ) -> VcsOperationResult {
        self.execute(git::create_branch(repo_path, branch_name, base_branch))
            .await
    }

    async fn git_checkout(&self, repo_path: &str, branch_name: &str) -> VcsOperationResult {
        self.execute(git::checkout(repo_path, branch_name)).await
    }

    async fn git_show(&self, repo_path: &str, revision: &str) -> VcsOperationResult {
        self.execute(git::show(repo_path, revision)).await
    }

    async fn github_create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
    ) -> VcsOperationResult {
        self.execute(github::create_issue(owner, repo, title, body))
            .await
    }

    async fn github_create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> VcsOperationResult {
        self.execute(github::create_pull_request(owner, repo, title, head, base, body))
            .await
    }

    async fn github_list_issues(
        &self,
        owner: &str,
        repo: &str,
        state: Option<&str>,
    ) -> VcsOperationResult {
        self.execute(github::list_issues(owner, repo, state)).await
    }

    async fn gitlab_create_issue(
        &self,
        project_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> VcsOperationResult {
        self.execute(gitlab::create_issue(project_id, title, description))
            .await
    }

    async fn gitlab_create_merge_request(
        &self,
        project_id: &str,
        title: &str,
        source_branch: &str,
        target_branch: &str,
        description: Option<&str>,
    ) -> VcsOperationResult {
        self.execute(gitlab::create_merge_request(
            project_id,
            title,
            source_branch,
            target_branch,
            description,
        ))
        .await
    }

    async fn jujutsu_status(&self, repo_path: &str) -> VcsOperationResult {
        self.execute(jujutsu::status(repo_path)).await
    }

    async fn jujutsu_log(&self, repo_path: &str, limit: Option<u32>) -> VcsOperationResult {
        self.execute(jujutsu::log(repo_path, limit)).await
    }

    async fn jujutsu_describe(&self, repo_path: &str, message: &str) -> VcsOperationResult {
        self.execute(jujutsu::describe(repo_path, message)).await
    }

    async fn jujutsu_new(&self, repo_path: &str, message: Option<&str>) -> VcsOperationResult {
        self.execute(jujutsu::new(repo_path, message)).await
    }
}

impl<T: VcsExecutor + ?Sized> VcsOperations for T {}
