//! Named server descriptors and their startup configuration.
//!
//! The registry is assembled once at startup (defaults, override file,
//! environment tokens, vendor paths) and then handed to the manager by
//! value, which freezes it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use vcsmcp_core::{Backend, Capability, ServerDescriptor};

use crate::env::EnvProvider;

/// Errors raised while configuring the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown server: {0}")]
    UnknownServer(String),

    #[error("Failed to read server config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid server config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid server '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

/// Partial descriptor from an override file. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ServerOverride {
    command: Option<String>,
    args: Option<Vec<String>>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    capabilities: Option<BTreeSet<Capability>>,
    enabled: Option<bool>,
    call_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideFile {
    #[serde(default)]
    servers: BTreeMap<String, ServerOverride>,
}

/// Ordered set of server descriptors, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRegistry {
    servers: Vec<ServerDescriptor>,
}

impl ServerRegistry {
    /// An empty registry.
    pub const fn empty() -> Self {
        Self {
            servers: Vec::new(),
        }
    }

    /// The four built-in backends. Only `git` is enabled; the hosted
    /// backends need a token and Jujutsu is opt-in.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for backend in Backend::ALL {
            registry.insert(default_descriptor(backend));
        }
        registry
    }

    /// Add a descriptor, replacing any existing one with the same name.
    pub fn insert(&mut self, descriptor: ServerDescriptor) {
        match self.get_mut(&descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.servers.push(descriptor),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ServerDescriptor> {
        self.servers.iter().find(|d| d.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ServerDescriptor> {
        self.servers.iter_mut().find(|d| d.name == name)
    }

    /// Server names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.servers.iter().map(|d| d.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerDescriptor> {
        self.servers.iter()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let descriptor = self
            .get_mut(name)
            .ok_or_else(|| RegistryError::UnknownServer(name.to_string()))?;
        descriptor.enabled = enabled;
        Ok(())
    }

    /// Inject credentials from the environment.
    ///
    /// A token enables its server; API URLs are passed through without
    /// enabling anything. Missing or empty variables change nothing.
    pub fn load_environment_tokens(&mut self, env: &dyn EnvProvider) {
        if let Some(token) = env.get_non_empty("GITHUB_TOKEN") {
            self.inject(Backend::GitHub, "GITHUB_PERSONAL_ACCESS_TOKEN", token, true);
        }
        if let Some(url) = env.get_non_empty("GITHUB_API_URL") {
            self.inject(Backend::GitHub, "GITHUB_API_URL", url, false);
        }
        if let Some(token) = env.get_non_empty("GITLAB_PERSONAL_ACCESS_TOKEN") {
            self.inject(Backend::GitLab, "GITLAB_PERSONAL_ACCESS_TOKEN", token, true);
        }
        if let Some(url) = env.get_non_empty("GITLAB_API_URL") {
            self.inject(Backend::GitLab, "GITLAB_API_URL", url, false);
        }
    }

    fn inject(&mut self, backend: Backend, key: &str, value: String, enable: bool) {
        let Some(descriptor) = self.get_mut(backend.as_str()) else {
            tracing::debug!(
                server_name = %backend,
                key,
                "No descriptor to inject environment into"
            );
            return;
        };
        descriptor.env.insert(key.to_string(), value);
        if enable && !descriptor.enabled {
            descriptor.enabled = true;
            tracing::info!(server_name = %backend, key, "Enabled server from environment token");
        }
    }

    /// Rewrite relative script paths in launch args to absolute paths under `vendor_root`.
    ///
    /// Only args that look like relative paths are touched, so calling this
    /// twice with the same root is a no-op the second time.
    pub fn setup_server_paths(&mut self, vendor_root: &Path) -> Result<(), RegistryError> {
        let root = std::path::absolute(vendor_root).map_err(|source| RegistryError::Io {
            path: vendor_root.to_path_buf(),
            source,
        })?;

        for descriptor in &mut self.servers {
            for arg in &mut descriptor.args {
                if is_relative_path_arg(arg) {
                    let rewritten = root.join(&*arg).to_string_lossy().into_owned();
                    tracing::debug!(
                        server_name = %descriptor.name,
                        from = %arg,
                        to = %rewritten,
                        "Resolved server path"
                    );
                    *arg = rewritten;
                }
            }
        }
        Ok(())
    }

    /// Merge descriptors from a JSON override file.
    ///
    /// ```json
    /// {"servers": {"git": {"callTimeoutSecs": 60}, "hg": {"command": "hg-mcp", "enabled": true}}}
    /// ```
    pub fn load_overrides(&mut self, path: &Path) -> Result<(), RegistryError> {
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: OverrideFile = serde_json::from_str(&text).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        for (name, patch) in file.servers {
            self.apply_override(name, patch)?;
        }

        tracing::debug!(path = %path.display(), "Loaded server overrides");
        Ok(())
    }

    fn apply_override(&mut self, name: String, patch: ServerOverride) -> Result<(), RegistryError> {
        let mut descriptor = match self.get(&name) {
            Some(existing) => existing.clone(),
            None => {
                let command = patch.command.clone().ok_or_else(|| RegistryError::Invalid {
                    name: name.clone(),
                    reason: "new servers need a command".to_string(),
                })?;
                ServerDescriptor::new(name.clone(), command, Vec::<String>::new())
            }
        };

        if let Some(command) = patch.command {
            descriptor.command = command;
        }
        if let Some(args) = patch.args {
            descriptor.args = args;
        }
        descriptor.env.extend(patch.env);
        if let Some(capabilities) = patch.capabilities {
            descriptor.capabilities = capabilities;
        }
        if let Some(enabled) = patch.enabled {
            descriptor.enabled = enabled;
        }
        if let Some(secs) = patch.call_timeout_secs {
            descriptor.call_timeout_secs = secs;
        }

        descriptor
            .validate()
            .map_err(|reason| RegistryError::Invalid { name, reason })?;
        self.insert(descriptor);
        Ok(())
    }
}

fn default_descriptor(backend: Backend) -> ServerDescriptor {
    let name = backend.as_str();
    let descriptor = match backend {
        Backend::Jujutsu => ServerDescriptor::new(name, "python3", ["jujutsu/server.py"]),
        Backend::Git | Backend::GitHub | Backend::GitLab => {
            ServerDescriptor::new(name, "node", [format!("{name}/dist/index.js")])
        }
    };
    descriptor.enabled(backend == Backend::Git)
}

fn is_relative_path_arg(arg: &str) -> bool {
    !arg.starts_with('-')
        && !arg.contains("://")
        && (arg.contains('/') || arg.contains(std::path::MAIN_SEPARATOR))
        && Path::new(arg).is_relative()
}
