//! Main commands enum and primary subcommands.

use clap::Subcommand;

use crate::vcs_commands::{GitCommand, GitHubCommand, GitLabCommand, JjCommand};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start every enabled server and report which ones came up
    Status,

    /// List the tools a server exposes
    Tools {
        /// Server name (e.g., "git")
        server: String,
    },

    /// Call any tool on any server
    Call {
        /// Server name (e.g., "git")
        server: String,
        /// Tool name (e.g., "git_status")
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Local Git operations
    Git {
        #[command(subcommand)]
        command: GitCommand,
    },

    /// GitHub issues and pull requests (needs GITHUB_TOKEN)
    #[command(name = "github")]
    GitHub {
        #[command(subcommand)]
        command: GitHubCommand,
    },

    /// GitLab issues and merge requests (needs GITLAB_PERSONAL_ACCESS_TOKEN)
    #[command(name = "gitlab")]
    GitLab {
        #[command(subcommand)]
        command: GitLabCommand,
    },

    /// Jujutsu operations (enable with --enable jujutsu)
    Jj {
        #[command(subcommand)]
        command: JjCommand,
    },
}
