//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for driving version-control tool servers.
///
/// Global options configure the server registry before any subcommand runs.
#[derive(Parser)]
#[command(name = "vcsmcp")]
#[command(about = "Drive Git, GitHub, GitLab and Jujutsu tool servers over MCP")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output, including error categories and codes
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Directory holding the backend server checkouts (falls back to $VCSMCP_SERVERS_DIR)
    #[arg(long = "servers-dir", global = true)]
    pub servers_dir: Option<PathBuf>,

    /// JSON file with server descriptor overrides (falls back to $VCSMCP_CONFIG)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable a server that is disabled by default (repeatable)
    #[arg(long = "enable", global = true, value_name = "SERVER")]
    pub enable: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "vcsmcp",
            "--verbose",
            "--servers-dir",
            "/opt/vcsmcp/servers",
            "--enable",
            "jujutsu",
            "--enable",
            "gitlab",
            "status",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.servers_dir, Some(PathBuf::from("/opt/vcsmcp/servers")));
        assert_eq!(cli.enable, ["jujutsu", "gitlab"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from(["vcsmcp", "tools", "git", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Tools { server }) if server == "git"));
    }
}
