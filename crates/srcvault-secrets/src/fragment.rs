//! Protected fragment file.
//!
//! Fragment A lives outside the deployable tree as a single `FRAG_A=<secret>`
//! line. It is read fresh on every call and never written by srcvault.

use std::fs;
use std::path::{Path, PathBuf};

use srcvault_core::SecretString;
use tracing::debug;

/// Key of the fragment line.
pub const FRAGMENT_KEY: &str = "FRAG_A";

/// Reader for the protected fragment file.
#[derive(Debug, Clone)]
pub struct FragmentStore {
    path: PathBuf,
}

impl FragmentStore {
    /// Store reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the fragment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read fragment A. Returns `None` when the file is unreadable, the key is
    /// absent, or its value is empty.
    pub fn load(&self) -> Option<SecretString> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => SecretString::new(content),
            Err(e) => {
                debug!(path = %self.path.display(), "fragment file unreadable: {e}");
                return None;
            }
        };
        parse_fragment(content.expose_secret())
    }
}

/// Extract the `FRAG_A` value from `KEY=value` lines.
fn parse_fragment(content: &str) -> Option<SecretString> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == FRAGMENT_KEY)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(SecretString::new)
}
