//! Configuration schema definitions.

use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-level vault configuration (`srcvault.json5` at the tree root).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Name of the vault's own protected directory under the root.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Protected fragment file. Relative paths resolve against the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_file: Option<PathBuf>,

    /// Device registry file. Relative paths resolve against the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_file: Option<PathBuf>,

    /// Tree walk inclusion policy.
    #[serde(default)]
    pub policy: TreePolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            fragment_file: None,
            registry_file: None,
            policy: TreePolicy::default(),
        }
    }
}

fn default_vault_dir() -> String {
    ".vault".to_string()
}

impl VaultConfig {
    /// Resolve the fragment file for a tree.
    ///
    /// Precedence: `$SRCVAULT_FRAGMENT_FILE`, then `fragment_file`, then
    /// `~/.srcvault/fragment.env`.
    pub fn fragment_path(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        if let Some(path) = env::get_path(vars::SRCVAULT_FRAGMENT_FILE) {
            return Ok(path);
        }
        match &self.fragment_file {
            Some(path) => {
                let expanded = paths::expand_tilde(&path.to_string_lossy());
                Ok(paths::resolve_against(root, &expanded))
            }
            None => paths::fragment_file(),
        }
    }

    /// Resolve the registry file for a tree.
    pub fn registry_path(&self, root: &Path) -> PathBuf {
        match &self.registry_file {
            Some(path) => paths::resolve_against(root, path),
            None => paths::registry_file(root, &self.vault_dir),
        }
    }

    /// Always-ignored directory names, including the vault directory itself.
    pub fn ignored_dirs(&self) -> Vec<String> {
        let mut dirs = self.policy.ignored_dirs.clone();
        if !dirs.iter().any(|d| d == &self.vault_dir) {
            dirs.push(self.vault_dir.clone());
        }
        dirs
    }
}

/// Which files and directories a lock/unlock walk touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreePolicy {
    /// File extensions (without the dot) that are locked and unlocked.
    pub managed_extensions: Vec<String>,

    /// Directory names never descended into (dependency caches, VCS metadata).
    pub ignored_dirs: Vec<String>,

    /// Runtime zone directory names; left plaintext while locking.
    pub runtime_dirs: Vec<String>,

    /// Build zone directory names; left plaintext while locking.
    pub build_dirs: Vec<String>,

    /// File names never transformed regardless of extension.
    pub excluded_files: Vec<String>,
}

impl Default for TreePolicy {
    fn default() -> Self {
        Self {
            managed_extensions: strings(&[
                "js", "jsx", "mjs", "cjs", "ts", "tsx", "css", "scss", "html", "ejs", "vue", "sql",
            ]),
            ignored_dirs: strings(&["node_modules", ".git", ".svn", ".hg"]),
            runtime_dirs: strings(&["runtime"]),
            build_dirs: strings(&["dist", "build"]),
            excluded_files: strings(&[
                "package.json",
                "package-lock.json",
                paths::CONFIG_FILE_NAME,
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_dirs_include_vault_dir() {
        let config = VaultConfig::default();
        let ignored = config.ignored_dirs();
        assert!(ignored.contains(&".vault".to_string()));
        assert!(ignored.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_ignored_dirs_no_duplicate_vault_dir() {
        let mut config = VaultConfig::default();
        config.policy.ignored_dirs.push(".vault".to_string());
        let count = config.ignored_dirs().iter().filter(|d| *d == ".vault").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_registry_path_default_and_override() {
        let root = Path::new("/srv/app");
        let mut config = VaultConfig::default();
        assert_eq!(
            config.registry_path(root),
            PathBuf::from("/srv/app/.vault/registry.bin")
        );

        config.registry_file = Some(PathBuf::from("state/devices.bin"));
        assert_eq!(
            config.registry_path(root),
            PathBuf::from("/srv/app/state/devices.bin")
        );
    }

    #[test]
    fn test_default_policy_protects_manifest() {
        let policy = TreePolicy::default();
        assert!(policy.excluded_files.contains(&"package.json".to_string()));
        assert!(policy.managed_extensions.contains(&"js".to_string()));
    }
}
