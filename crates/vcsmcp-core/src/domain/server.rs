//! Tool server descriptors.
//!
//! A descriptor is everything needed to launch one backend over stdio. The
//! registry creates them from compiled-in defaults, mutates them once during
//! startup configuration (tokens, vendor paths), then hands them to the
//! manager, after which they are never changed.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-call timeout for tool invocations.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// MCP capability advertised for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Tools,
    Resources,
    Prompts,
    Roots,
    Sampling,
}

fn default_capabilities() -> BTreeSet<Capability> {
    BTreeSet::from([Capability::Tools])
}

const fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

/// Launch description for one stdio tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDescriptor {
    /// Registry key, e.g. `git`.
    pub name: String,

    /// Executable to launch (name resolved via PATH, or absolute).
    pub command: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment for the child, merged over the parent environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default = "default_capabilities")]
    pub capabilities: BTreeSet<Capability>,

    /// Disabled servers are skipped by `start_all_servers` without error.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl ServerDescriptor {
    /// Create a disabled descriptor with the default capabilities and timeout.
    pub fn new<I, S>(name: impl Into<String>, command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            capabilities: default_capabilities(),
            enabled: false,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn with_call_timeout_secs(mut self, secs: u64) -> Self {
        self.call_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Per-call timeout as a `Duration`.
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Validate the launch configuration.
    ///
    /// Returns an error message if the descriptor cannot be launched as-is.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Server name cannot be empty".to_string());
        }

        if self.command.is_empty() {
            return Err(format!("Server '{}' command cannot be empty", self.name));
        }

        // Flags and arguments belong in `args`
        if self.command.contains(char::is_whitespace) {
            return Err(format!(
                "Server '{}' command must be an executable name/path only (e.g., 'node'). \
                 Put flags and arguments in 'args'.",
                self.name
            ));
        }

        if self.call_timeout_secs == 0 {
            return Err(format!("Server '{}' call timeout must be positive", self.name));
        }

        Ok(())
    }
}
