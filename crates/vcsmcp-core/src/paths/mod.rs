//! Path utilities for vcsmcp data directories and user-configurable locations.
//!
//! - Vendor root holding the backend server checkouts
//! - Optional JSON file with descriptor overrides
//!
//! Resolution order is always: explicit argument, then environment variable,
//! then the platform default from `dirs`. Callers pass the environment value
//! in, so nothing here reads process state except the current directory.

mod error;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub use error::PathError;

/// Environment variable overriding the vendor root.
pub const SERVERS_DIR_ENV: &str = "VCSMCP_SERVERS_DIR";

/// Environment variable pointing at a descriptor override file.
pub const CONFIG_ENV: &str = "VCSMCP_CONFIG";

const APP_DIR: &str = "vcsmcp";

/// Default vendor root: `<data_local_dir>/vcsmcp/servers`.
pub fn default_servers_dir() -> Result<PathBuf, PathError> {
    let base = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(base.join(APP_DIR).join("servers"))
}

/// Default override file: `<config_dir>/vcsmcp/servers.json`.
pub fn default_config_path() -> Result<PathBuf, PathError> {
    let base = dirs::config_dir().ok_or(PathError::NoConfigDir)?;
    Ok(base.join(APP_DIR).join("servers.json"))
}

/// Resolve the vendor root to an absolute path.
pub fn resolve_servers_dir(
    explicit: Option<&Path>,
    env_value: Option<&OsStr>,
) -> Result<PathBuf, PathError> {
    let chosen = match (explicit, env_value) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(value)) => PathBuf::from(value),
        (None, None) => return default_servers_dir(),
    };

    absolutize(chosen)
}

/// Resolve the override file.
///
/// Explicit and environment paths must exist; the platform default is
/// optional and yields `Ok(None)` when absent.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<&OsStr>,
) -> Result<Option<PathBuf>, PathError> {
    let requested = match (explicit, env_value) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(value)) => Some(PathBuf::from(value)),
        (None, None) => None,
    };

    if let Some(path) = requested {
        let path = absolutize(path)?;
        if !path.is_file() {
            return Err(PathError::FileNotFound(path));
        }
        return Ok(Some(path));
    }

    let default = default_config_path()?;
    Ok(default.is_file().then_some(default))
}

fn absolutize(path: PathBuf) -> Result<PathBuf, PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = std::env::current_dir().map_err(|e| PathError::CurrentDirError(e.to_string()))?;
    Ok(cwd.join(path))
}
