//! Owner validation for srcvault.
//!
//! Reconstructs the master key from three fragments (a protected on-disk
//! secret, the interactive passkey, and a hardware fingerprint), keeps an
//! encrypted registry of authorized devices, and provides the per-file
//! codec used to lock and unlock a source tree.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod fingerprint;
pub mod fragment;
pub mod keys;
pub mod recovery;
pub mod registry;
pub mod validator;

pub use error::{CodecError, Result, VaultError};
pub use fingerprint::{Fingerprinter, IdentitySource, RawIdentity, StaticIdentity, SystemIdentity};
pub use fragment::FragmentStore;
pub use keys::MasterKey;
pub use recovery::{Normalization, Recovered, RecoveryProbe};
pub use registry::{DeviceRegistry, RegistryState};
pub use validator::{Grant, OwnerValidator};
