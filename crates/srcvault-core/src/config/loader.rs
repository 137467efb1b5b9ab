//! Configuration loading and persistence.

use super::{TreePolicy, VaultConfig};
use crate::error::ConfigError;
use std::fs;
use std::path::Path;
use tracing::debug;

impl VaultConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a file path, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. The vault directory is a single path component
        if !is_plain_name(&self.vault_dir) {
            errors.push(format!(
                "vault_dir must be a plain directory name, got '{}'",
                self.vault_dir
            ));
        }

        // 2. Policy lists
        errors.extend(self.policy.problems());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

impl TreePolicy {
    /// Collect every problem with the policy lists.
    fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.managed_extensions.is_empty() {
            errors.push("policy.managed_extensions must not be empty".to_string());
        }
        for ext in &self.managed_extensions {
            if ext.starts_with('.') {
                errors.push(format!(
                    "Extension '{}' must be given without a leading dot",
                    ext
                ));
            } else if !is_plain_name(ext) {
                errors.push(format!("Invalid extension '{}'", ext));
            }
        }

        let named_lists = [
            ("ignored_dirs", &self.ignored_dirs),
            ("runtime_dirs", &self.runtime_dirs),
            ("build_dirs", &self.build_dirs),
            ("excluded_files", &self.excluded_files),
        ];
        for (list, names) in named_lists {
            for name in names {
                if !is_plain_name(name) {
                    errors.push(format!(
                        "policy.{}: '{}' must be a plain name without separators",
                        list, name
                    ));
                }
            }
        }

        errors
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
