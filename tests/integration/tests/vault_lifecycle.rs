//! Enrollment, lock, drift and recovery across the secrets and tree crates.

use std::fs;
use std::path::{Path, PathBuf};

use srcvault_core::SecretString;
use srcvault_secrets::{
    DeviceRegistry, Fingerprinter, FragmentStore, Normalization, OwnerValidator, RecoveryProbe,
    StaticIdentity, VaultError,
};
use srcvault_tree::{Direction, TreeWalker};
use tempfile::TempDir;

struct Machine {
    root: TempDir,
    home: TempDir,
}

impl Machine {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        write(root.path(), "src/app.js", "start();\n");
        write(root.path(), "src/views/index.ejs", "<h1><%= title %></h1>\n");
        write(root.path(), "db/schema.sql", "CREATE TABLE t (id INT);\n");
        write(root.path(), "runtime/server.js", "listen();\n");
        write(root.path(), "package.json", "{}\n");

        let home = TempDir::new().unwrap();
        fs::write(home.path().join("fragment.env"), "# owner\nFRAG_A=X\n").unwrap();
        Self { root, home }
    }

    fn fragments(&self) -> FragmentStore {
        FragmentStore::new(self.home.path().join("fragment.env"))
    }

    fn registry(&self) -> DeviceRegistry {
        DeviceRegistry::new(self.root.path().join(".vault").join("registry.bin"))
    }

    fn validator(&self, identity: StaticIdentity) -> OwnerValidator<StaticIdentity> {
        OwnerValidator::new(self.fragments(), Fingerprinter::new(identity), self.registry())
    }

    fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.root.path().join(rel)).unwrap()
    }
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn passkey() -> SecretString {
    SecretString::new("Y")
}

#[test]
fn test_enroll_lock_unlock() {
    let machine = Machine::new();
    let identity = StaticIdentity::new(&["cpu-1", "disk-2"], "box");
    let walker = TreeWalker::default();

    let grant = machine.validator(identity.clone()).authorize(&passkey()).unwrap();
    assert!(grant.enrolled);
    let locked = walker.process(machine.root.path(), &grant.key, Direction::Lock).unwrap();
    assert_eq!(locked.transformed, 3);
    assert_eq!(machine.read("runtime/server.js"), b"listen();\n");

    let grant = machine.validator(identity).authorize(&passkey()).unwrap();
    assert!(!grant.enrolled);
    let unlocked = walker.process(machine.root.path(), &grant.key, Direction::Unlock).unwrap();
    assert_eq!(unlocked.transformed, locked.transformed);
    assert_eq!(machine.read("src/app.js"), b"start();\n");
}

#[test]
fn test_drift_denied_then_recovered() {
    let machine = Machine::new();
    let walker = TreeWalker::default();

    let enrolled = StaticIdentity::new(&["cpu-1", "disk-2"], "box");
    let grant = machine.validator(enrolled).authorize(&passkey()).unwrap();
    walker.process(machine.root.path(), &grant.key, Direction::Lock).unwrap();

    // Same hardware, reported with stray whitespace.
    let drifted = StaticIdentity::new(&["cpu-1\n", " disk-2 "], "box");
    let denied = machine.validator(drifted.clone()).authorize(&passkey());
    assert!(matches!(denied, Err(VaultError::AccessDenied)));
    assert!(machine.read("src/app.js").starts_with(b"SVAULT1"));

    let probe = RecoveryProbe::new(machine.fragments(), drifted, machine.registry());
    let recovered = probe.recover(&passkey()).unwrap();
    assert_eq!(recovered.normalization, Normalization::Trimmed);

    let report = walker
        .process(machine.root.path(), &recovered.key, Direction::Unlock)
        .unwrap();
    assert_eq!(report.transformed, 3);
    assert_eq!(machine.read("db/schema.sql"), b"CREATE TABLE t (id INT);\n");
}

#[test]
fn test_recovery_never_guesses_passkey() {
    let machine = Machine::new();
    let identity = StaticIdentity::new(&["cpu-1", "disk-2"], "box");
    machine.validator(identity.clone()).authorize(&passkey()).unwrap();

    let registry_before = fs::read(machine.registry().path()).unwrap();
    let probe = RecoveryProbe::new(machine.fragments(), identity, machine.registry());
    let result = probe.recover(&SecretString::new("wrong"));

    assert!(matches!(result, Err(VaultError::AccessDenied)));
    assert_eq!(fs::read(machine.registry().path()).unwrap(), registry_before);
}

#[test]
fn test_other_machine_cannot_unlock() {
    let machine = Machine::new();
    machine
        .validator(StaticIdentity::new(&["cpu-1"], "box"))
        .authorize(&passkey())
        .unwrap();

    let stranger = machine.validator(StaticIdentity::new(&["cpu-9"], "other"));
    assert!(!stranger.validate(&passkey()));
}
