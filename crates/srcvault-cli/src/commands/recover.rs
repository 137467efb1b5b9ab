//! `srcvault recover`: unlock after fingerprint drift.
//!
//! Tries fingerprint normalizations against the registry with the supplied
//! passkey. The registry itself is never rewritten.

use std::process::ExitCode;

use console::style;
use srcvault_secrets::VaultError;
use srcvault_tree::Direction;

use super::{ask_passkey, vault, Options, Refusal};
use crate::render;

/// Run the recover command.
pub async fn run(options: &Options) -> anyhow::Result<ExitCode> {
    let ctx = options.context()?;
    let passkey = match ask_passkey(options).await? {
        Ok(passkey) => passkey,
        Err(refusal) => return Ok(refusal.into()),
    };

    let probe = ctx.probe();
    let recovered = match tokio::task::spawn_blocking(move || probe.recover(&passkey)).await? {
        Ok(recovered) => recovered,
        Err(VaultError::AccessDenied) => return Ok(Refusal::Denied.into()),
        Err(e) => return Err(e.into()),
    };

    eprintln!(
        "{} Registry opened with fingerprint variant {}",
        style(render::CHECK).green(),
        style(recovered.normalization).bold()
    );

    let report = vault::walk(
        ctx.walker(),
        ctx.root.clone(),
        recovered.key,
        Direction::Unlock,
    )
    .await?;
    render::render_report(Direction::Unlock, &report);
    Ok(ExitCode::SUCCESS)
}
