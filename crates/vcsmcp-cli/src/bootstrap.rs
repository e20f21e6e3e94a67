//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the registry and manager are wired
//! together. Configuration layers apply in a fixed order: compiled-in
//! defaults, the override file, environment tokens, `--enable` flags, and
//! finally vendor paths. The registry is frozen when the manager takes it.
//!
//! Command handlers receive the composed `CliContext`; nothing else
//! constructs a manager.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vcsmcp_core::{
    CONFIG_ENV, SERVERS_DIR_ENV, VcsExecutor, resolve_config_path, resolve_servers_dir,
};
use vcsmcp_mcp::{EnvProvider, McpManager, ServerRegistry, SystemEnv};

use crate::error::CliError;
use crate::logging::LogEmitter;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Vendor root override.
    pub servers_dir: Option<PathBuf>,
    /// Descriptor override file.
    pub config: Option<PathBuf>,
    /// Servers to enable on top of the defaults.
    pub enable: Vec<String>,
    /// Show diagnostic detail on failures.
    pub verbose: bool,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            servers_dir: cli.servers_dir.clone(),
            config: cli.config.clone(),
            enable: cli.enable.clone(),
            verbose: cli.verbose,
        }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    manager: Arc<McpManager>,
    verbose: bool,
}

impl CliContext {
    /// Access the manager.
    pub fn manager(&self) -> &McpManager {
        &self.manager
    }

    /// The manager seen through the executor port.
    pub fn executor(&self) -> &dyn VcsExecutor {
        self.manager.as_ref()
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Stop every server this invocation started.
    pub async fn shutdown(&self) {
        self.manager.stop_all_servers().await;
    }
}

/// Assemble the server registry from every configuration layer.
pub fn build_registry(
    config: &CliConfig,
    env: &dyn EnvProvider,
) -> Result<ServerRegistry, CliError> {
    let mut registry = ServerRegistry::with_defaults();

    let config_env = env.get(CONFIG_ENV);
    if let Some(path) = resolve_config_path(config.config.as_deref(), config_env.as_deref())? {
        registry.load_overrides(&path)?;
    }

    registry.load_environment_tokens(env);

    for name in &config.enable {
        registry.set_enabled(name, true)?;
    }

    let servers_env = env.get(SERVERS_DIR_ENV);
    let servers_dir = resolve_servers_dir(config.servers_dir.as_deref(), servers_env.as_deref())?;
    registry.setup_server_paths(&servers_dir)?;

    log_registry(&registry, &servers_dir);
    Ok(registry)
}

fn log_registry(registry: &ServerRegistry, servers_dir: &Path) {
    tracing::debug!(servers_dir = %servers_dir.display(), "Resolved vendor root");
    for descriptor in registry.iter() {
        tracing::debug!(
            server_name = %descriptor.name,
            enabled = descriptor.enabled,
            command = %descriptor.command,
            args = ?descriptor.args,
            "Configured server"
        );
    }
}

/// Bootstrap the CLI application from the process environment.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let registry = build_registry(config, &SystemEnv)?;
    Ok(bootstrap_with(registry, config.verbose))
}

/// Bootstrap with a prepared registry (for testing).
pub fn bootstrap_with(registry: ServerRegistry, verbose: bool) -> CliContext {
    let manager = McpManager::new(registry).with_emitter(Arc::new(LogEmitter));
    CliContext {
        manager: Arc::new(manager),
        verbose,
    }
}
