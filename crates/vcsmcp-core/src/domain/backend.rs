//! The closed set of backends known to the convenience layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A version-control backend served by one tool server.
///
/// Routing underneath stays string-keyed (`VcsOperation::server_name`), so
/// servers registered from configuration files still work. This enum only
/// fronts the typed helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Git,
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "gitlab")]
    GitLab,
    Jujutsu,
}

impl Backend {
    /// All backends in registry order.
    pub const ALL: [Self; 4] = [Self::Git, Self::GitHub, Self::GitLab, Self::Jujutsu];

    /// Server name used as the registry key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
            Self::Jujutsu => "jujutsu",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "git" => Ok(Self::Git),
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            "jujutsu" | "jj" => Ok(Self::Jujutsu),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}
