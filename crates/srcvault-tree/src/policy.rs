//! Zone policy.
//!
//! Directories are classified by a rule table evaluated once per node: the
//! first rule whose name set contains the directory name decides its zone
//! and action, and unmatched directories belong to the source zone. Files
//! are admitted by extension and filtered by an exclusion list.

use srcvault_core::VaultConfig;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Direction of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Lock,
    Unlock,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Lock => f.write_str("lock"),
            Direction::Unlock => f.write_str("unlock"),
        }
    }
}

/// Region of the managed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Dependency caches, VCS metadata, the vault directory.
    Ignored,
    /// Code the live service runs from; stays plaintext while locked.
    Runtime,
    /// Shipped artifacts; stays plaintext while locked.
    Build,
    /// Everything else.
    Source,
}

/// What a walk does with a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirAction {
    /// Never descend.
    Skip,
    /// Descend in both directions.
    Recurse,
    /// Descend only when unlocking.
    SkipWhenLocking,
}

impl DirAction {
    /// Whether a walk in `direction` descends into the directory.
    pub fn descends(self, direction: Direction) -> bool {
        match self {
            DirAction::Skip => false,
            DirAction::Recurse => true,
            DirAction::SkipWhenLocking => direction == Direction::Unlock,
        }
    }
}

/// One row of the directory rule table.
#[derive(Debug, Clone)]
struct DirRule {
    names: HashSet<String>,
    zone: Zone,
    action: DirAction,
}

/// Compiled inclusion policy for a walk.
#[derive(Debug, Clone)]
pub struct ZonePolicy {
    dir_rules: Vec<DirRule>,
    extensions: HashSet<String>,
    excluded_files: HashSet<String>,
}

impl ZonePolicy {
    /// Compile the policy section of a vault config.
    pub fn from_config(config: &VaultConfig) -> Self {
        let policy = &config.policy;
        let rule = |names: &[String], zone, action| DirRule {
            names: names.iter().cloned().collect(),
            zone,
            action,
        };

        Self {
            dir_rules: vec![
                rule(&config.ignored_dirs(), Zone::Ignored, DirAction::Skip),
                rule(&policy.runtime_dirs, Zone::Runtime, DirAction::SkipWhenLocking),
                rule(&policy.build_dirs, Zone::Build, DirAction::SkipWhenLocking),
            ],
            extensions: policy
                .managed_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            excluded_files: policy.excluded_files.iter().cloned().collect(),
        }
    }

    /// Zone and action for a directory name.
    pub fn classify_dir(&self, name: &str) -> (Zone, DirAction) {
        self.dir_rules
            .iter()
            .find(|rule| rule.names.contains(name))
            .map(|rule| (rule.zone, rule.action))
            .unwrap_or((Zone::Source, DirAction::Recurse))
    }

    /// Whether a walk in `direction` descends into a directory named `name`.
    pub fn descends_into(&self, name: &str, direction: Direction) -> bool {
        self.classify_dir(name).1.descends(direction)
    }

    /// Whether a file name is managed: extension on the allow-list and name
    /// not excluded.
    pub fn is_managed_file(&self, name: &str) -> bool {
        if self.excluded_files.contains(name) {
            return false;
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self::from_config(&VaultConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_dirs_skipped_both_ways() {
        let policy = ZonePolicy::default();
        for name in ["node_modules", ".git", ".vault"] {
            assert_eq!(policy.classify_dir(name), (Zone::Ignored, DirAction::Skip));
            assert!(!policy.descends_into(name, Direction::Lock));
            assert!(!policy.descends_into(name, Direction::Unlock));
        }
    }

    #[test]
    fn test_runtime_and_build_skipped_only_when_locking() {
        let policy = ZonePolicy::default();
        assert_eq!(policy.classify_dir("runtime").0, Zone::Runtime);
        assert_eq!(policy.classify_dir("dist").0, Zone::Build);
        for name in ["runtime", "dist", "build"] {
            assert!(!policy.descends_into(name, Direction::Lock));
            assert!(policy.descends_into(name, Direction::Unlock));
        }
    }

    #[test]
    fn test_source_dirs_recurse() {
        let policy = ZonePolicy::default();
        assert_eq!(policy.classify_dir("src"), (Zone::Source, DirAction::Recurse));
        assert!(policy.descends_into("src", Direction::Lock));
    }

    #[test]
    fn test_managed_files() {
        let policy = ZonePolicy::default();
        assert!(policy.is_managed_file("a.js"));
        assert!(policy.is_managed_file("a.test.js"));
        assert!(policy.is_managed_file("Page.TSX"));
        assert!(!policy.is_managed_file("README"));
        assert!(!policy.is_managed_file("logo.png"));
    }

    #[test]
    fn test_excluded_names_never_managed() {
        let mut config = VaultConfig::default();
        config.policy.managed_extensions.push("json".to_string());
        config.policy.excluded_files.push("gate.js".to_string());
        let policy = ZonePolicy::from_config(&config);

        assert!(!policy.is_managed_file("package.json"));
        assert!(!policy.is_managed_file("gate.js"));
        assert!(policy.is_managed_file("tsconfig.json"));
    }

    #[test]
    fn test_custom_vault_dir_is_ignored() {
        let mut config = VaultConfig::default();
        config.vault_dir = ".owner".to_string();
        let policy = ZonePolicy::from_config(&config);
        assert_eq!(policy.classify_dir(".owner").0, Zone::Ignored);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut config = VaultConfig::default();
        config.policy.runtime_dirs.push("node_modules".to_string());
        let policy = ZonePolicy::from_config(&config);
        assert_eq!(policy.classify_dir("node_modules").0, Zone::Ignored);
    }
}
