//! Command-line front end for the vcsmcp server orchestration layer.
//!
//! The binary parses arguments, composes a [`CliContext`] in
//! [`bootstrap`], and routes each subcommand to a handler. Handlers that
//! run operations only see the `VcsExecutor` port.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tokio as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;
pub mod vcs_commands;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap, bootstrap_with, build_registry};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
pub use vcs_commands::{GitCommand, GitHubCommand, GitLabCommand, JjCommand};
