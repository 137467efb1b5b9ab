//! Recovery from fingerprint drift.
//!
//! Raw identifiers can shift between runs (a trailing newline, different
//! padding, a header line from the enumeration tool), which changes the
//! fingerprint and locks the owner out even with the right passkey on the
//! right machine. The probe rebuilds the fingerprint from several
//! normalizations of the raw identifiers and tries each derived key against
//! the registry until one opens it. Only the fingerprint varies; the passkey
//! and fragment A are never guessed. The registry is not modified.

use srcvault_core::SecretString;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, error, info};

use crate::crypto::sha256_hex;
use crate::error::{Result, VaultError};
use crate::fingerprint::{IdentitySource, RawIdentity, SystemIdentity};
use crate::fragment::FragmentStore;
use crate::keys::{self, MasterKey};
use crate::registry::{self, DeviceRegistry};

/// Header and label words emitted by hardware enumeration tools.
const ENUMERATION_LABELS: &[&str] = &["ProcessorId", "SerialNumber", "HostName", "MACAddress"];

/// One way of turning raw identifiers into fingerprint input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalization {
    /// Identifiers concatenated as reported.
    Raw,
    /// Each identifier trimmed, then concatenated.
    Trimmed,
    /// Enumeration header lines and `label:`/`label=` prefixes removed.
    LabelStripped,
    /// Concatenation with every whitespace run collapsed to one space.
    WhitespaceCollapsed,
    /// Host name as reported.
    HostOnly,
    /// Host name trimmed.
    TrimmedHostOnly,
}

impl Normalization {
    /// Every normalization, in probe order.
    pub const ALL: [Normalization; 6] = [
        Normalization::Raw,
        Normalization::Trimmed,
        Normalization::LabelStripped,
        Normalization::WhitespaceCollapsed,
        Normalization::HostOnly,
        Normalization::TrimmedHostOnly,
    ];

    /// Short name for display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Trimmed => "trimmed",
            Self::LabelStripped => "label-stripped",
            Self::WhitespaceCollapsed => "whitespace-collapsed",
            Self::HostOnly => "host-only",
            Self::TrimmedHostOnly => "trimmed-host-only",
        }
    }

    /// Fingerprint input for `raw`, or `None` when the needed parts are missing.
    pub fn apply(self, raw: &RawIdentity) -> Option<String> {
        let hardware = || (!raw.hardware.is_empty()).then_some(&raw.hardware);
        match self {
            Self::Raw => hardware().map(|ids| ids.concat()),
            Self::Trimmed => hardware().map(|ids| ids.iter().map(|s| s.trim()).collect()),
            Self::LabelStripped => {
                hardware().map(|ids| ids.iter().map(|s| strip_labels(s)).collect())
            }
            Self::WhitespaceCollapsed => hardware().map(|ids| collapse_whitespace(&ids.concat())),
            Self::HostOnly => raw.host.clone(),
            Self::TrimmedHostOnly => raw.host.as_deref().map(|h| h.trim().to_string()),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fingerprint to try, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub normalization: Normalization,
    pub fingerprint: String,
}

/// Build one candidate per normalization, dropping duplicates and empties.
pub fn candidates(raw: &RawIdentity) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    Normalization::ALL
        .into_iter()
        .filter_map(|normalization| {
            let input = normalization.apply(raw)?;
            if input.is_empty() {
                return None;
            }
            let fingerprint = sha256_hex(input.as_bytes());
            seen.insert(fingerprint.clone()).then_some(Candidate {
                normalization,
                fingerprint,
            })
        })
        .collect()
}

/// A key recovered from a fingerprint variant.
#[derive(Debug)]
pub struct Recovered {
    pub key: MasterKey,
    pub normalization: Normalization,
}

/// Brute-forces fingerprint variants against the registry.
#[derive(Debug, Clone)]
pub struct RecoveryProbe<S = SystemIdentity> {
    fragments: FragmentStore,
    source: S,
    registry: DeviceRegistry,
}

impl RecoveryProbe<SystemIdentity> {
    /// Probe using the running machine's identifiers.
    pub fn system(fragments: FragmentStore, registry: DeviceRegistry) -> Self {
        Self::new(fragments, SystemIdentity, registry)
    }
}

impl<S: IdentitySource> RecoveryProbe<S> {
    pub fn new(fragments: FragmentStore, source: S, registry: DeviceRegistry) -> Self {
        Self {
            fragments,
            source,
            registry,
        }
    }

    /// Try every normalization of the current machine's identifiers.
    pub fn recover(&self, passkey: &SecretString) -> Result<Recovered> {
        let raw = RawIdentity::gather(&self.source);
        self.probe(passkey, &candidates(&raw))
    }

    /// Try the given candidates in order; the first that opens the registry
    /// wins.
    pub fn probe(&self, passkey: &SecretString, candidates: &[Candidate]) -> Result<Recovered> {
        let fragment_a = self.fragments.load();
        if fragment_a.is_none() {
            error!(path = %self.fragments.path().display(), "fragment A missing");
            return Err(VaultError::FragmentMissing(self.fragments.path().to_path_buf()));
        }
        let blob = self.registry.read_blob()?;

        for candidate in candidates {
            let Some(key) = keys::derive(fragment_a.as_ref(), passkey, &candidate.fingerprint)
            else {
                continue;
            };
            match registry::open(&blob, &key) {
                Ok(_) => {
                    info!(variant = %candidate.normalization, "registry opened by fingerprint variant");
                    return Ok(Recovered {
                        key,
                        normalization: candidate.normalization,
                    });
                }
                Err(e) => debug!(variant = %candidate.normalization, "variant rejected: {e}"),
            }
        }

        Err(VaultError::AccessDenied)
    }
}

/// Drop enumeration header lines and `label:`/`label=` prefixes, then join
/// the trimmed remainder.
fn strip_labels(component: &str) -> String {
    component
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_label(line))
        .map(|line| match line.split_once(['=', ':']) {
            Some((label, value)) if is_label(label.trim()) => value.trim(),
            _ => line,
        })
        .collect()
}

fn is_label(word: &str) -> bool {
    ENUMERATION_LABELS
        .iter()
        .any(|label| label.eq_ignore_ascii_case(word))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
