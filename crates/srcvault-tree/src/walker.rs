//! Recursive lock/unlock walk.
//!
//! Pre-order traversal with entries sorted by name. Per-file failures are
//! logged and counted but never abort the walk, and every file records its
//! own state through the codec marker, so an interrupted walk is finished
//! by running the same direction again.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use srcvault_secrets::{codec, MasterKey};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{FileError, WalkError};
use crate::policy::{Direction, ZonePolicy};

/// Suffix of the temporary file written next to a file being replaced.
const TEMP_SUFFIX: &str = ".srcvault-tmp";

/// Result of one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Files whose contents were rewritten.
    pub transformed: usize,
    /// Managed files already in the target state.
    pub unchanged: usize,
    /// Managed files skipped because of an error.
    pub failed: usize,
}

/// Managed files by state, without needing a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStatus {
    pub encrypted: Vec<PathBuf>,
    pub plaintext: Vec<PathBuf>,
}

/// Applies the vault codec across a tree.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    policy: ZonePolicy,
}

impl TreeWalker {
    pub fn new(policy: ZonePolicy) -> Self {
        Self { policy }
    }

    /// Lock or unlock every managed file under `root`.
    pub fn process(
        &self,
        root: &Path,
        key: &MasterKey,
        direction: Direction,
    ) -> Result<WalkReport, WalkError> {
        let mut report = WalkReport::default();

        for path in self.managed_files(root, direction, &mut report.failed)? {
            match transform_file(&path, key, direction) {
                Ok(true) => {
                    debug!(path = %path.display(), %direction, "transformed");
                    report.transformed += 1;
                }
                Ok(false) => report.unchanged += 1,
                Err(e) => {
                    warn!(path = %path.display(), %direction, "skipping file: {e}");
                    report.failed += 1;
                }
            }
        }

        info!(
            %direction,
            transformed = report.transformed,
            unchanged = report.unchanged,
            failed = report.failed,
            "walk complete"
        );
        Ok(report)
    }

    /// Classify every managed file under `root` (all zones) by marker.
    pub fn scan(&self, root: &Path) -> Result<TreeStatus, WalkError> {
        let mut status = TreeStatus::default();
        let mut unreadable = 0;

        for path in self.managed_files(root, Direction::Unlock, &mut unreadable)? {
            match read_marker(&path) {
                Ok(true) => status.encrypted.push(path),
                Ok(false) => status.plaintext.push(path),
                Err(e) => warn!(path = %path.display(), "cannot read file: {e}"),
            }
        }

        Ok(status)
    }

    /// Managed files reachable in `direction`, in pre-order. Traversal
    /// errors are logged and added to `failed`.
    fn managed_files(
        &self,
        root: &Path,
        direction: Direction,
        failed: &mut usize,
    ) -> Result<Vec<PathBuf>, WalkError> {
        if !fs::metadata(root)?.is_dir() {
            return Err(WalkError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let walk = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.admits(entry, direction));

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    *failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.policy.is_managed_file(name))
            {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Directory filter. The root itself is always entered.
    fn admits(&self, entry: &DirEntry, direction: Direction) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        match entry.file_name().to_str() {
            Some(name) => self.policy.descends_into(name, direction),
            None => true,
        }
    }
}

/// Apply the codec to one file. Returns whether the file was rewritten.
fn transform_file(path: &Path, key: &MasterKey, direction: Direction) -> Result<bool, FileError> {
    let data = fs::read(path)?;
    let output = match direction {
        Direction::Lock => codec::encrypt(&data, key),
        Direction::Unlock => codec::decrypt(&data, key)?,
    };

    match output {
        Cow::Borrowed(_) => Ok(false),
        Cow::Owned(bytes) => {
            replace_file(path, &bytes)?;
            Ok(true)
        }
    }
}

/// Replace `path` with `data` through a sibling temp file, keeping the
/// original permissions.
fn replace_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(TEMP_SUFFIX);
    let temp_path = path.with_file_name(temp_name);

    let result = fs::write(&temp_path, data)
        .and_then(|_| fs::set_permissions(&temp_path, permissions))
        .and_then(|_| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn read_marker(path: &Path) -> std::io::Result<bool> {
    use std::io::Read;

    let mut head = [0u8; codec::MARKER.len()];
    let mut file = fs::File::open(path)?;
    let mut filled = 0;
    while filled < head.len() {
        let n = file.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(codec::is_encrypted(&head[..filled]))
}
