//! Tree walk error types.

use std::path::PathBuf;
use srcvault_secrets::CodecError;
use thiserror::Error;

/// Errors that abort a walk before any file is touched.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-file failures. Logged and counted; the walk continues.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
