//! Hardware fingerprinting.
//!
//! The fingerprint is the SHA-256 of machine identifiers concatenated exactly
//! as the platform reports them:
//!
//! - Windows: processor id and disk serial, from `wmic`.
//! - Linux: host name and the first non-loopback network adapter address.
//! - Elsewhere: host name only.
//!
//! Raw identifiers are kept untouched (headers, padding, trailing newlines)
//! so the value matches what earlier runs enrolled. That also makes it only
//! semi-stable; see [`crate::recovery`] for the drift workaround.

use std::io;
use tracing::{debug, warn};

use crate::crypto::sha256_hex;

/// Source of raw machine-identifying strings.
pub trait IdentitySource {
    /// Hardware identifiers in enumeration order, exactly as reported.
    fn hardware_ids(&self) -> io::Result<Vec<String>>;

    /// The machine's host name, exactly as reported.
    fn host_name(&self) -> io::Result<String>;
}

/// Raw identifiers gathered from an [`IdentitySource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIdentity {
    /// Hardware identifiers; empty when enumeration failed.
    pub hardware: Vec<String>,
    /// Host name, when available.
    pub host: Option<String>,
}

impl RawIdentity {
    /// Collect identifiers, swallowing enumeration failures.
    pub fn gather(source: &impl IdentitySource) -> Self {
        let hardware = match source.hardware_ids() {
            Ok(ids) => ids,
            Err(e) => {
                debug!("hardware enumeration failed: {e}");
                Vec::new()
            }
        };
        let host = match source.host_name() {
            Ok(host) => Some(host),
            Err(e) => {
                warn!("host name lookup failed: {e}");
                None
            }
        };
        Self { hardware, host }
    }

    /// The string hashed into the fingerprint: the raw hardware concatenation,
    /// or the host name alone when hardware enumeration produced nothing.
    pub fn canonical(&self) -> String {
        if self.hardware.is_empty() {
            self.host.clone().unwrap_or_default()
        } else {
            self.hardware.concat()
        }
    }

    /// Hex fingerprint of [`Self::canonical`].
    pub fn fingerprint(&self) -> String {
        sha256_hex(self.canonical().as_bytes())
    }
}

/// Produces the current machine's fingerprint.
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter<S = SystemIdentity> {
    source: S,
}

impl Fingerprinter<SystemIdentity> {
    /// Fingerprinter backed by the running system.
    pub fn system() -> Self {
        Self {
            source: SystemIdentity,
        }
    }
}

impl<S: IdentitySource> Fingerprinter<S> {
    /// Fingerprinter backed by a custom identity source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Gather raw identifiers without hashing them.
    pub fn raw(&self) -> RawIdentity {
        RawIdentity::gather(&self.source)
    }

    /// Compute the 64-character hex fingerprint. Never fails.
    pub fn produce(&self) -> String {
        let raw = self.raw();
        if raw.hardware.is_empty() {
            debug!("fingerprint falling back to host name");
        }
        raw.fingerprint()
    }
}

/// Identity source reading the running machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentitySource for SystemIdentity {
    fn hardware_ids(&self) -> io::Result<Vec<String>> {
        platform::hardware_ids()
    }

    fn host_name(&self) -> io::Result<String> {
        hostname::get().map(|h| h.to_string_lossy().into_owned())
    }
}

// ---------------------------------------------------------------------------
// Windows: processor id + disk serial
// ---------------------------------------------------------------------------

#[cfg(windows)]
mod platform {
    use std::io;
    use std::process::Command;

    fn wmic(class: &str, property: &str) -> io::Result<String> {
        let output = Command::new("wmic").args([class, "get", property]).output()?;
        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("wmic {class} get {property} exited with {}", output.status),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub(super) fn hardware_ids() -> io::Result<Vec<String>> {
        Ok(vec![
            wmic("cpu", "ProcessorId")?,
            wmic("diskdrive", "SerialNumber")?,
        ])
    }
}

// ---------------------------------------------------------------------------
// Linux: host name + primary adapter address
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
mod platform {
    use std::fs;
    use std::io;
    use std::path::Path;

    const SYS_NET: &str = "/sys/class/net";
    const NULL_MAC: &str = "00:00:00:00:00:00";

    /// Address of the first physical adapter, by sorted interface name.
    ///
    /// Only interfaces backed by a device (`<iface>/device` exists) count,
    /// so bridges, veth pairs and docker interfaces coming and going do not
    /// move the fingerprint.
    pub(super) fn primary_adapter_address(sys_net: &Path) -> io::Result<String> {
        let mut names: Vec<String> = fs::read_dir(sys_net)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "lo" && sys_net.join(name).join("device").exists())
            .collect();
        names.sort();

        for name in names {
            let path = sys_net.join(&name).join("address");
            if let Ok(address) = fs::read_to_string(&path) {
                let trimmed = address.trim();
                if !trimmed.is_empty() && trimmed != NULL_MAC {
                    return Ok(address);
                }
            }
        }

        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no network adapter with a hardware address",
        ))
    }

    pub(super) fn hardware_ids() -> io::Result<Vec<String>> {
        let host = hostname::get()?.to_string_lossy().into_owned();
        Ok(vec![host, primary_adapter_address(Path::new(SYS_NET))?])
    }
}

// ---------------------------------------------------------------------------
// Fallback for other platforms
// ---------------------------------------------------------------------------

#[cfg(not(any(windows, target_os = "linux")))]
mod platform {
    use std::io;

    pub(super) fn hardware_ids() -> io::Result<Vec<String>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "hardware enumeration not available on this platform",
        ))
    }
}

/// Fixed identifiers, for tests and for replaying a recorded identity.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    /// Returned from [`IdentitySource::hardware_ids`]; `None` simulates failure.
    pub hardware: Option<Vec<String>>,
    /// Returned from [`IdentitySource::host_name`]; `None` simulates failure.
    pub host: Option<String>,
}

impl StaticIdentity {
    /// Identity with the given hardware identifiers and host name.
    pub fn new(hardware: &[&str], host: &str) -> Self {
        Self {
            hardware: Some(hardware.iter().map(|s| s.to_string()).collect()),
            host: Some(host.to_string()),
        }
    }
}

impl IdentitySource for StaticIdentity {
    fn hardware_ids(&self) -> io::Result<Vec<String>> {
        self.hardware
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no hardware ids"))
    }

    fn host_name(&self) -> io::Result<String> {
        self.host
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no host name"))
    }
}
