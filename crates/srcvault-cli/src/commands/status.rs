//! `srcvault status`: managed files by state. Needs no passkey.

use std::process::ExitCode;

use clap::Args;

use super::Options;
use crate::render;

/// Status command arguments.
#[derive(Args)]
pub struct StatusArgs {
    /// List every managed file with its state
    #[arg(long)]
    pub list: bool,
}

/// Run the status command.
pub async fn run(options: &Options, args: StatusArgs) -> anyhow::Result<ExitCode> {
    let ctx = options.context()?;
    let walker = ctx.walker();
    let root = ctx.root.clone();

    let status = tokio::task::spawn_blocking(move || walker.scan(&root)).await??;
    render::render_status(&status, args.list);
    Ok(ExitCode::SUCCESS)
}
