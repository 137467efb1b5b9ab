//! Owner validation.
//!
//! A caller is the owner when fragment A is present, the passkey and the
//! current fingerprint reconstruct a key that opens the device registry, and
//! the fingerprint is enrolled in it. On a machine without a registry the
//! first caller is enrolled. Each call is all-or-nothing; there is no
//! lockout or backoff between attempts.

use srcvault_core::SecretString;
use tracing::{error, info, warn};

use crate::error::{Result, VaultError};
use crate::fingerprint::{Fingerprinter, IdentitySource, SystemIdentity};
use crate::fragment::FragmentStore;
use crate::keys::{self, MasterKey};
use crate::registry::{self, DeviceRegistry, RegistryState};

/// Outcome of a successful authorization.
#[derive(Debug)]
pub struct Grant {
    /// Key for the vault codec.
    pub key: MasterKey,
    /// True when this call created the registry.
    pub enrolled: bool,
}

/// Decides whether the caller is the owner on an authorized device.
#[derive(Debug, Clone)]
pub struct OwnerValidator<S = SystemIdentity> {
    fragments: FragmentStore,
    fingerprinter: Fingerprinter<S>,
    registry: DeviceRegistry,
}

impl OwnerValidator<SystemIdentity> {
    /// Validator using the running machine's fingerprint.
    pub fn system(fragments: FragmentStore, registry: DeviceRegistry) -> Self {
        Self::new(fragments, Fingerprinter::system(), registry)
    }
}

impl<S: IdentitySource> OwnerValidator<S> {
    pub fn new(
        fragments: FragmentStore,
        fingerprinter: Fingerprinter<S>,
        registry: DeviceRegistry,
    ) -> Self {
        Self {
            fragments,
            fingerprinter,
            registry,
        }
    }

    /// The device registry this validator consults.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Authorize the caller and hand back the master key.
    pub fn authorize(&self, passkey: &SecretString) -> Result<Grant> {
        let fragment_a = self.fragments.load();
        if fragment_a.is_none() {
            error!(path = %self.fragments.path().display(), "fragment A missing");
            return Err(VaultError::FragmentMissing(self.fragments.path().to_path_buf()));
        }

        let fingerprint = self.fingerprinter.produce();
        let key = keys::derive(fragment_a.as_ref(), passkey, &fingerprint)
            .ok_or_else(|| VaultError::FragmentMissing(self.fragments.path().to_path_buf()))?;

        if self.registry.state() == RegistryState::Absent {
            self.registry.bootstrap(&key, &fingerprint)?;
            info!("first run: device enrolled");
            return Ok(Grant { key, enrolled: true });
        }

        let devices = match self.registry.decrypt(&key) {
            Ok(devices) => devices,
            Err(VaultError::DecryptionFailed(_)) => {
                warn!("registry did not open with the supplied passkey on this device");
                return Err(VaultError::AccessDenied);
            }
            Err(e) => return Err(e),
        };

        if registry::is_authorized(&fingerprint, &devices) {
            Ok(Grant {
                key,
                enrolled: false,
            })
        } else {
            warn!("device not enrolled in registry");
            Err(VaultError::AccessDenied)
        }
    }

    /// Whether the caller is the owner on an authorized device.
    pub fn validate(&self, passkey: &SecretString) -> bool {
        self.authorize(passkey).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::StaticIdentity;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
    }

    impl Fixture {
        fn new(fragment: Option<&str>) -> Self {
            let tmp = TempDir::new().unwrap();
            if let Some(value) = fragment {
                fs::write(tmp.path().join("fragment.env"), format!("FRAG_A={value}\n")).unwrap();
            }
            Self { tmp }
        }

        fn fragments(&self) -> FragmentStore {
            FragmentStore::new(self.tmp.path().join("fragment.env"))
        }

        fn registry(&self) -> DeviceRegistry {
            DeviceRegistry::new(self.tmp.path().join(".vault").join("registry.bin"))
        }

        fn validator(&self, machine: &str) -> OwnerValidator<StaticIdentity> {
            OwnerValidator::new(
                self.fragments(),
                Fingerprinter::new(StaticIdentity::new(&[machine], "host")),
                self.registry(),
            )
        }
    }

    fn passkey(value: &str) -> SecretString {
        SecretString::new(value)
    }

    #[test]
    fn test_bootstrap_enrolls_caller() {
        let fx = Fixture::new(Some("X"));
        let validator = fx.validator("machine-1");

        assert!(validator.validate(&passkey("Y")));

        let fingerprint = validator.fingerprinter.produce();
        let key = keys::derive(Some(&SecretString::new("X")), &passkey("Y"), &fingerprint).unwrap();
        let devices = fx.registry().decrypt(&key).unwrap();
        assert_eq!(devices.into_iter().collect::<Vec<_>>(), vec![fingerprint]);
    }

    #[test]
    fn test_bootstrap_grant_reports_enrollment() {
        let fx = Fixture::new(Some("X"));
        let validator = fx.validator("machine-1");

        assert!(validator.authorize(&passkey("Y")).unwrap().enrolled);
        assert!(!validator.authorize(&passkey("Y")).unwrap().enrolled);
    }

    #[test]
    fn test_second_call_same_device_succeeds_with_same_key() {
        let fx = Fixture::new(Some("X"));
        let validator = fx.validator("machine-1");

        let first = validator.authorize(&passkey("Y")).unwrap();
        let second = validator.authorize(&passkey("Y")).unwrap();
        assert_eq!(first.key, second.key);
    }

    #[test]
    fn test_wrong_passkey_denied() {
        let fx = Fixture::new(Some("X"));
        assert!(fx.validator("machine-1").validate(&passkey("Y")));

        let result = fx.validator("machine-1").authorize(&passkey("wrong"));
        assert!(matches!(result, Err(VaultError::AccessDenied)));
    }

    #[test]
    fn test_other_device_denied_even_with_correct_passkey() {
        let fx = Fixture::new(Some("X"));
        assert!(fx.validator("machine-1").validate(&passkey("Y")));

        assert!(!fx.validator("machine-2").validate(&passkey("Y")));
    }

    #[test]
    fn test_unenrolled_fingerprint_denied_when_registry_opens() {
        // Registry readable under machine-2's key but listing only machine-1.
        let fx = Fixture::new(Some("X"));
        let validator = fx.validator("machine-2");
        let fingerprint = validator.fingerprinter.produce();
        let key = keys::derive(Some(&SecretString::new("X")), &passkey("Y"), &fingerprint).unwrap();

        let devices: BTreeSet<String> = ["someone-else".to_string()].into_iter().collect();
        let blob = registry::seal(&devices, &key).unwrap();
        fs::create_dir_all(fx.tmp.path().join(".vault")).unwrap();
        fs::write(fx.registry().path(), blob).unwrap();

        assert!(matches!(
            validator.authorize(&passkey("Y")),
            Err(VaultError::AccessDenied)
        ));
    }

    #[test]
    fn test_missing_fragment_is_fatal_and_creates_nothing() {
        let fx = Fixture::new(None);
        let result = fx.validator("machine-1").authorize(&passkey("Y"));

        let err = result.unwrap_err();
        assert!(err.is_fatal_config());
        assert_eq!(fx.registry().state(), RegistryState::Absent);
    }
}
