//! Config save/load roundtrip integration tests.

use srcvault_core::VaultConfig;
use srcvault_tree::{Direction, ZonePolicy};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("srcvault.json5");

    let config = VaultConfig::default();
    config.save(&path).unwrap();

    let loaded = VaultConfig::load(&path).unwrap();
    assert_eq!(loaded.vault_dir, config.vault_dir);
    assert_eq!(loaded.policy, config.policy);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("srcvault.json5");

    let mut config = VaultConfig::default();
    config.policy.build_dirs.push("out".to_string());
    config.save(&path).unwrap();

    let loaded = VaultConfig::load(&path).unwrap();
    let policy = ZonePolicy::from_config(&loaded);
    assert!(!policy.descends_into("out", Direction::Lock));
    assert!(policy.descends_into("out", Direction::Unlock));
}

#[test]
fn test_config_load_nonexistent() {
    let result = VaultConfig::load(Path::new("/nonexistent/srcvault.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = VaultConfig::parse("not valid json5");
    assert!(result.is_err());
}
