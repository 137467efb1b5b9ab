//! `srcvault lock` and `srcvault unlock`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use srcvault_secrets::MasterKey;
use srcvault_tree::{Direction, TreeWalker, WalkReport};

use super::{authorize, Options};
use crate::render;

/// Run a lock or unlock walk.
pub async fn run(options: &Options, direction: Direction) -> anyhow::Result<ExitCode> {
    let ctx = options.context()?;
    let grant = match authorize(options, &ctx).await? {
        Ok(grant) => grant,
        Err(refusal) => return Ok(refusal.into()),
    };

    let report = walk(ctx.walker(), ctx.root.clone(), grant.key, direction).await?;
    render::render_report(direction, &report);
    Ok(ExitCode::SUCCESS)
}

/// Run the walk on the blocking pool behind a spinner.
pub async fn walk(
    walker: TreeWalker,
    root: PathBuf,
    key: MasterKey,
    direction: Direction,
) -> anyhow::Result<WalkReport> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("{}ing {}", direction, root.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result =
        tokio::task::spawn_blocking(move || walker.process(&root, &key, direction)).await;
    spinner.finish_and_clear();

    Ok(result??)
}
