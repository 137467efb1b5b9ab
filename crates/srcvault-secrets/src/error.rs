//! Error types for owner validation and the vault codec.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating the owner or touching the registry.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Fragment A is missing; nothing can proceed.
    #[error("Fragment A not found in {0}")]
    FragmentMissing(PathBuf),

    /// Wrong passkey or unauthorized device.
    #[error("Access denied")]
    AccessDenied,

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    /// Whether this error must stop every operation (missing configuration).
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Self::FragmentMissing(_))
    }
}

/// Per-file codec failures. The walker logs these and moves on.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Encrypted payload truncated: {len} bytes, header needs {needed}")]
    Truncated { len: usize, needed: usize },

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
