//! Diagnostic commands.

use std::path::Path;
use std::process::ExitCode;

use console::style;
use srcvault_secrets::{Fingerprinter, RegistryState};

use super::Options;
use crate::context::VaultContext;
use crate::render::{CHECK, CROSS, WARN};

/// Run the doctor command.
pub async fn run(options: &Options) -> anyhow::Result<ExitCode> {
    println!("srcvault doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    // Check config
    println!("Checking configuration...");

    let ctx = match options.context() {
        Ok(ctx) => ctx,
        Err(e) => {
            println!("  {} Configuration error: {:#}", style(CROSS).red(), e);
            anyhow::bail!("1 error(s) found");
        }
    };
    println!("  {} Tree root: {}", style(CHECK).green(), ctx.root.display());
    if ctx.config_path.exists() {
        println!(
            "  {} Configuration loaded: {}",
            style(CHECK).green(),
            ctx.config_path.display()
        );
    } else {
        println!(
            "  {} No configuration file at {}, using defaults",
            style(WARN).yellow(),
            ctx.config_path.display()
        );
        warnings += 1;
    }

    // Check fragment file
    println!("\nChecking fragment file...");
    check_fragment(&ctx, &mut errors, &mut warnings);

    // Check registry
    println!("\nChecking device registry...");
    match ctx.registry().state() {
        RegistryState::Present => {
            println!(
                "  {} Registry present: {}",
                style(CHECK).green(),
                ctx.registry_path.display()
            );
        }
        RegistryState::Absent => {
            println!(
                "  {} No registry yet; the next successful passkey check enrolls this device",
                style(WARN).yellow()
            );
            warnings += 1;
        }
    }

    // Check fingerprint sources
    println!("\nChecking device fingerprint...");
    let raw = tokio::task::spawn_blocking(|| Fingerprinter::system().raw()).await?;
    if !raw.hardware.is_empty() {
        println!(
            "  {} {} hardware identifier(s) found",
            style(CHECK).green(),
            raw.hardware.len()
        );
    } else if raw.host.is_some() {
        println!(
            "  {} No hardware identifiers; fingerprint falls back to the host name",
            style(WARN).yellow()
        );
        warnings += 1;
    } else {
        println!(
            "  {} No identifiers available; fingerprint is not device-bound",
            style(CROSS).red()
        );
        errors += 1;
    }

    // Check tree
    println!("\nChecking tree...");
    let walker = ctx.walker();
    let root = ctx.root.clone();
    match tokio::task::spawn_blocking(move || walker.scan(&root)).await? {
        Ok(status) => {
            println!(
                "  {} {} encrypted, {} plaintext managed file(s)",
                style(CHECK).green(),
                status.encrypted.len(),
                status.plaintext.len()
            );
        }
        Err(e) => {
            println!("  {} Tree scan failed: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    // Summary
    println!("\n{}", style("Summary").bold());
    println!("  Errors: {}", if errors > 0 { style(errors).red() } else { style(errors).green() });
    println!("  Warnings: {}", if warnings > 0 { style(warnings).yellow() } else { style(warnings).green() });

    if errors > 0 {
        anyhow::bail!("{} error(s) found", errors);
    }

    Ok(ExitCode::SUCCESS)
}

fn check_fragment(ctx: &VaultContext, errors: &mut usize, warnings: &mut usize) {
    let path = &ctx.fragment_path;

    if ctx.fragments().load().is_some() {
        println!("  {} Fragment present: {}", style(CHECK).green(), path.display());
    } else if path.exists() {
        println!(
            "  {} {} has no FRAG_A entry",
            style(CROSS).red(),
            path.display()
        );
        *errors += 1;
        return;
    } else {
        println!("  {} Fragment file missing: {}", style(CROSS).red(), path.display());
        *errors += 1;
        return;
    }

    if path.starts_with(&ctx.root) {
        println!(
            "  {} Fragment file lives inside the tree; keep it outside the deployable code",
            style(WARN).yellow()
        );
        *warnings += 1;
    }

    if is_shared(path) {
        println!(
            "  {} Fragment file is readable by group or others",
            style(WARN).yellow()
        );
        *warnings += 1;
    }
}

#[cfg(unix)]
fn is_shared(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o077 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_shared(_path: &Path) -> bool {
    false
}
