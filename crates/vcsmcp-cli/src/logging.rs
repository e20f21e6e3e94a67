//! Tracing setup and the lifecycle event sink for the CLI.

use tracing_subscriber::EnvFilter;
use vcsmcp_core::{EventEmitter, VcsEvent};

/// Install the global subscriber, writing to stderr so stdout stays clean.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok(); // Ignore error if already initialized
}

/// Emits server lifecycle events as log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl EventEmitter for LogEmitter {
    fn emit(&self, event: VcsEvent) {
        match &event {
            VcsEvent::ServerStarted { server_name, .. } => {
                tracing::info!(server_name = %server_name, "server started");
            }
            VcsEvent::ServerStopped { server_name, .. } => {
                tracing::info!(server_name = %server_name, "server stopped");
            }
            VcsEvent::ServerStartFailed {
                server_name,
                message,
                ..
            } => {
                tracing::warn!(
                    server_name = %server_name,
                    error = %message,
                    "server failed to start"
                );
            }
            VcsEvent::ServerSkipped { server_name, .. } => {
                tracing::debug!(server_name = %server_name, "server disabled");
            }
        }
    }
}
