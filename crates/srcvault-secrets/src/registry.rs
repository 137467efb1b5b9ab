//! Encrypted registry of authorized device fingerprints.
//!
//! The registry file is a single AES-256-CBC blob over a JSON array of
//! fingerprint strings. It is written once, on first validation, under a
//! fixed all-zero IV; existing registries depend on that layout, so it is
//! kept as is. There is no revoke or expiry path.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::crypto::{self, IV_SIZE};
use crate::error::{Result, VaultError};
use crate::keys::MasterKey;

/// IV used for every registry write.
pub const REGISTRY_IV: [u8; IV_SIZE] = [0u8; IV_SIZE];

/// Whether the registry file has been created yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Absent,
    Present,
}

/// Handle to the registry file.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    path: PathBuf,
}

impl DeviceRegistry {
    /// Registry stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state of the registry file.
    pub fn state(&self) -> RegistryState {
        if self.path.exists() {
            RegistryState::Present
        } else {
            RegistryState::Absent
        }
    }

    /// Create the registry seeded with exactly `fingerprint`.
    ///
    /// Fails if a registry already exists; it is never overwritten.
    pub fn bootstrap(&self, key: &MasterKey, fingerprint: &str) -> Result<()> {
        let devices: BTreeSet<String> = [fingerprint.to_string()].into_iter().collect();
        let blob = seal(&devices, key)?;

        if let Some(parent) = self.path.parent() {
            ensure_private_dir(parent)?;
        }
        write_new_file(&self.path, &blob).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => VaultError::Registry(format!(
                "registry already exists at {}",
                self.path.display()
            )),
            _ => VaultError::Io(e),
        })?;

        debug!(path = %self.path.display(), "device registry created");
        Ok(())
    }

    /// Read the raw ciphertext.
    pub fn read_blob(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(blob) => Ok(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(VaultError::Registry(format!(
                "no registry at {}",
                self.path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Decrypt the registry into the set of authorized fingerprints.
    pub fn decrypt(&self, key: &MasterKey) -> Result<BTreeSet<String>> {
        open(&self.read_blob()?, key)
    }
}

/// Encrypt a device set into a registry blob.
pub fn seal(devices: &BTreeSet<String>, key: &MasterKey) -> Result<Vec<u8>> {
    let plaintext = serde_json::to_vec(devices)?;
    Ok(crypto::encrypt_cbc(key, &REGISTRY_IV, &plaintext))
}

/// Decrypt a registry blob. A wrong key fails either on padding or because
/// the plaintext is not a JSON array of strings.
pub fn open(blob: &[u8], key: &MasterKey) -> Result<BTreeSet<String>> {
    let plaintext = crypto::decrypt_cbc(key, &REGISTRY_IV, blob)
        .map_err(|e| VaultError::DecryptionFailed(e.to_string()))?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::DecryptionFailed(format!("registry plaintext malformed: {e}")))
}

/// Membership test.
pub fn is_authorized(fingerprint: &str, devices: &BTreeSet<String>) -> bool {
    devices.contains(fingerprint)
}

fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

/// Create `path` exclusively and write `data`, mode 0600 on Unix.
fn write_new_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
