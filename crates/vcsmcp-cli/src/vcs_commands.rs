//! Per-backend subcommands.
//!
//! Each variant maps onto one typed operation builder.

use clap::Subcommand;

/// Git subcommands.
#[derive(Subcommand)]
pub enum GitCommand {
    /// Show the working tree status
    Status {
        /// Repository path
        #[arg(short, long, default_value = ".")]
        repo: String,
    },

    /// Show changes (unstaged by default)
    Diff {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// Show staged changes instead
        #[arg(long, conflicts_with = "target")]
        staged: bool,
        /// Diff against a branch or commit
        #[arg(long)]
        target: Option<String>,
    },

    /// Stage files
    Add {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// Files to stage
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Record staged changes
    Commit {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Show recent commits
    Log {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// Number of commits to show
        #[arg(short = 'n', long, default_value = "10")]
        max_count: u32,
    },

    /// Create a branch
    Branch {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// New branch name
        name: String,
        /// Branch to start from
        #[arg(long)]
        base: Option<String>,
    },

    /// Switch branches
    Checkout {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// Branch to switch to
        branch: String,
    },

    /// Show a commit
    Show {
        #[arg(short, long, default_value = ".")]
        repo: String,
        /// Revision to show
        #[arg(default_value = "HEAD")]
        revision: String,
    },
}

/// GitHub subcommands. Repositories are given as `owner/repo`.
#[derive(Subcommand)]
pub enum GitHubCommand {
    /// Create an issue
    Issue {
        /// Repository as owner/repo
        repo: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Create a pull request
    Pr {
        /// Repository as owner/repo
        repo: String,
        #[arg(short, long)]
        title: String,
        /// Branch with the changes
        #[arg(long)]
        head: String,
        /// Branch to merge into
        #[arg(long, default_value = "main")]
        base: String,
        #[arg(short, long)]
        body: Option<String>,
    },

    /// List issues
    Issues {
        /// Repository as owner/repo
        repo: String,
        /// open, closed or all
        #[arg(long)]
        state: Option<String>,
    },
}

/// GitLab subcommands. Projects are given by id or `namespace/path`.
#[derive(Subcommand)]
pub enum GitLabCommand {
    /// Create an issue
    Issue {
        /// Project id or namespace/path
        project: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Create a merge request
    Mr {
        /// Project id or namespace/path
        project: String,
        #[arg(short, long)]
        title: String,
        /// Branch with the changes
        #[arg(long)]
        source: String,
        /// Branch to merge into
        #[arg(long, default_value = "main")]
        target: String,
        #[arg(short, long)]
        description: Option<String>,
    },
}

/// Jujutsu subcommands.
#[derive(Subcommand)]
pub enum JjCommand {
    /// Show the working copy status
    Status {
        #[arg(short, long, default_value = ".")]
        repo: String,
    },

    /// Show the change log
    Log {
        #[arg(short, long, default_value = ".")]
        repo: String,
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },

    /// Set the description of the working-copy change
    Describe {
        #[arg(short, long, default_value = ".")]
        repo: String,
        #[arg(short, long)]
        message: String,
    },

    /// Start a new change
    New {
        #[arg(short, long, default_value = ".")]
        repo: String,
        #[arg(short, long)]
        message: Option<String>,
    },
}
