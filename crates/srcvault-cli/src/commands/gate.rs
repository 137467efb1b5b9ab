//! Passkey gate in front of an arbitrary command.

use std::process::{ExitCode, ExitStatus};

use anyhow::Context;
use clap::Args;
use tokio::process::Command;
use tracing::info;

use super::{authorize, Options};

/// Gate command arguments.
#[derive(Args)]
pub struct GateArgs {
    /// Command to run once the owner is verified, after `--`
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

/// Run the gate command.
pub async fn run(options: &Options, args: GateArgs) -> anyhow::Result<ExitCode> {
    let ctx = options.context()?;
    if let Err(refusal) = authorize(options, &ctx).await? {
        return Ok(refusal.into());
    }

    let Some((program, rest)) = args.command.split_first() else {
        anyhow::bail!("no command given");
    };
    info!(%program, "spawning gated command");

    let status = Command::new(program)
        .args(rest)
        .status()
        .await
        .with_context(|| format!("failed to start {program}"))?;

    Ok(ExitCode::from(exit_code_of(status)))
}

/// Exit code mirroring the child's. Signals map to `128 + signal` on Unix.
fn exit_code_of(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return exit_code_from_raw(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return (128 + signal).clamp(0, 255) as u8;
        }
    }

    1
}

/// Codes outside `0..=255` (Windows crash statuses, negative exits) map
/// to 1.
fn exit_code_from_raw(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes_in_range_pass_through() {
        assert_eq!(exit_code_from_raw(0), 0);
        assert_eq!(exit_code_from_raw(7), 7);
        assert_eq!(exit_code_from_raw(255), 255);
    }

    #[test]
    fn test_out_of_range_codes_are_failures() {
        // STATUS_ACCESS_VIOLATION as reported on Windows
        assert_eq!(exit_code_from_raw(0xC000_0005_u32 as i32), 1);
        assert_eq!(exit_code_from_raw(-1), 1);
        assert_eq!(exit_code_from_raw(256), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_propagates() {
        let status = Command::new("sh").args(["-c", "exit 3"]).status().await.unwrap();
        assert_eq!(exit_code_of(status), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_maps_to_zero() {
        let status = Command::new("true").status().await.unwrap();
        assert_eq!(exit_code_of(status), 0);
    }
}
