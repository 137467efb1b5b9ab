//! Master key reconstruction.
//!
//! The master key is never stored. It is rebuilt on every invocation as
//! `SHA-256(fragment_a ":" passkey ":" fingerprint)` and zeroed on drop.

use sha2::{Digest, Sha256};
use srcvault_core::SecretString;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Master key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Separator between fragments in the hash input.
const FRAGMENT_SEPARATOR: &[u8] = b":";

/// A 256-bit symmetric key scoped to one process invocation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

impl PartialEq for MasterKey {
    fn eq(&self, other: &Self) -> bool {
        srcvault_core::secret::constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for MasterKey {}

/// Derive the master key from the three fragments.
///
/// Returns `None` when fragment A is not available; callers must treat
/// that as fatal.
pub fn derive(
    fragment_a: Option<&SecretString>,
    passkey: &SecretString,
    fingerprint: &str,
) -> Option<MasterKey> {
    let fragment_a = fragment_a?;

    let mut hasher = Sha256::new();
    hasher.update(fragment_a.expose_secret().as_bytes());
    hasher.update(FRAGMENT_SEPARATOR);
    hasher.update(passkey.expose_secret().as_bytes());
    hasher.update(FRAGMENT_SEPARATOR);
    hasher.update(fingerprint.as_bytes());

    Some(MasterKey::from_bytes(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_matches_joined_digest() {
        let a = SecretString::new("X");
        let b = SecretString::new("Y");
        let key = derive(Some(&a), &b, "fp").unwrap();

        let expected: [u8; KEY_SIZE] = Sha256::digest(b"X:Y:fp").into();
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = SecretString::new("fragment");
        let b = SecretString::new("passkey");
        assert_eq!(derive(Some(&a), &b, "fp"), derive(Some(&a), &b, "fp"));
    }

    #[test]
    fn test_each_fragment_changes_key() {
        let a = SecretString::new("fragment");
        let b = SecretString::new("passkey");
        let base = derive(Some(&a), &b, "fp").unwrap();

        let other_a = SecretString::new("fragment2");
        let other_b = SecretString::new("passkey2");
        assert_ne!(derive(Some(&other_a), &b, "fp").unwrap(), base);
        assert_ne!(derive(Some(&a), &other_b, "fp").unwrap(), base);
        assert_ne!(derive(Some(&a), &b, "fp2").unwrap(), base);
    }

    #[test]
    fn test_missing_fragment_a_is_none() {
        let b = SecretString::new("passkey");
        assert!(derive(None, &b, "fp").is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = MasterKey::from_bytes([9u8; KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "MasterKey([REDACTED])");
    }
}
