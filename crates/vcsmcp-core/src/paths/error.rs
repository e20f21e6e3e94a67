//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Could not determine the system configuration directory.
    #[error("Cannot determine system config directory")]
    NoConfigDir,

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,

    /// An explicitly requested file does not exist.
    #[error("File {0} does not exist")]
    FileNotFound(PathBuf),

    /// Failed to get the current working directory.
    #[error("Cannot determine current directory: {0}")]
    CurrentDirError(String),
}
