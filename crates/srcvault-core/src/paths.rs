//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Project config file name, looked up at the managed tree root.
pub const CONFIG_FILE_NAME: &str = "srcvault.json5";

/// Fragment file name inside the vault home.
pub const FRAGMENT_FILE_NAME: &str = "fragment.env";

/// Registry file name inside the vault directory of a managed tree.
pub const REGISTRY_FILE_NAME: &str = "registry.bin";

/// Get the srcvault home directory (`$SRCVAULT_HOME` or `~/.srcvault`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_path(vars::SRCVAULT_HOME) {
        return Ok(home);
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".srcvault"))
}

/// Get the default protected fragment file (`~/.srcvault/fragment.env`).
///
/// `$SRCVAULT_FRAGMENT_FILE` takes precedence when set.
pub fn fragment_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_path(vars::SRCVAULT_FRAGMENT_FILE) {
        return Ok(path);
    }
    Ok(base_dir()?.join(FRAGMENT_FILE_NAME))
}

/// Get the project config file for a managed tree.
pub fn config_file(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Get the registry file for a managed tree (`<root>/<vault_dir>/registry.bin`).
pub fn registry_file(root: &Path, vault_dir: &str) -> PathBuf {
    root.join(vault_dir).join(REGISTRY_FILE_NAME)
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
