//! CLI-specific error types and exit code mapping.

use thiserror::Error;
use vcsmcp_core::PathError;
use vcsmcp_mcp::{McpManagerError, RegistryError};

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// An operation reached a server and failed there.
    #[error("{0}")]
    Operation(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A server could not be reached at all.
    #[error("Server unavailable: {0}")]
    Unavailable(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Operation(_) => 1,
            Self::Arguments(_) => 2,   // EX_USAGE
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Io { .. } => Self::Io(err.to_string()),
            RegistryError::UnknownServer(_) => Self::Arguments(err.to_string()),
            RegistryError::Parse { .. } | RegistryError::Invalid { .. } => {
                Self::Config(err.to_string())
            }
        }
    }
}

impl From<McpManagerError> for CliError {
    fn from(err: McpManagerError) -> Self {
        match err {
            McpManagerError::UnknownServer(_) => Self::Arguments(err.to_string()),
            McpManagerError::NotRunning(_) | McpManagerError::StartFailed { .. } => {
                Self::Unavailable(err.to_string())
            }
            McpManagerError::Client(_) => Self::Operation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
