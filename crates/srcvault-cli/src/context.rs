//! Resolved locations and config for one invocation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use srcvault_core::{paths, VaultConfig};
use srcvault_secrets::{DeviceRegistry, FragmentStore, OwnerValidator, RecoveryProbe};
use srcvault_tree::{TreeWalker, ZonePolicy};
use tracing::debug;

/// Everything a command needs to know about the managed tree.
#[derive(Debug, Clone)]
pub struct VaultContext {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: VaultConfig,
    pub fragment_path: PathBuf,
    pub registry_path: PathBuf,
}

impl VaultContext {
    /// Resolve the root, load and validate the config.
    pub fn load(root: Option<&Path>, config: Option<&Path>) -> anyhow::Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().context("cannot determine current directory")?,
        };
        let root = root
            .canonicalize()
            .with_context(|| format!("tree root {} is not accessible", root.display()))?;

        let config_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| paths::config_file(&root));
        let config = VaultConfig::load_or_default(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;
        config.validate()?;

        let fragment_path = config.fragment_path(&root)?;
        let registry_path = config.registry_path(&root);
        debug!(
            root = %root.display(),
            fragment = %fragment_path.display(),
            registry = %registry_path.display(),
            "context resolved"
        );

        Ok(Self {
            root,
            config_path,
            config,
            fragment_path,
            registry_path,
        })
    }

    pub fn fragments(&self) -> FragmentStore {
        FragmentStore::new(&self.fragment_path)
    }

    pub fn registry(&self) -> DeviceRegistry {
        DeviceRegistry::new(&self.registry_path)
    }

    pub fn validator(&self) -> OwnerValidator {
        OwnerValidator::system(self.fragments(), self.registry())
    }

    pub fn probe(&self) -> RecoveryProbe {
        RecoveryProbe::system(self.fragments(), self.registry())
    }

    pub fn walker(&self) -> TreeWalker {
        TreeWalker::new(ZonePolicy::from_config(&self.config))
    }
}
