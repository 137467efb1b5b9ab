//! CLI command implementations.

pub mod doctor;
pub mod gate;
pub mod recover;
pub mod status;
pub mod vault;

use std::path::PathBuf;
use std::process::ExitCode;

use srcvault_core::SecretString;
use srcvault_secrets::{Grant, VaultError};

use crate::context::VaultContext;
use crate::prompt::{self, PromptError};
use crate::render;

/// Exit status when the owner check fails.
pub const EXIT_DENIED: u8 = 1;

/// Exit status when passkey entry is aborted.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub passkey_stdin: bool,
}

impl Options {
    pub fn context(&self) -> anyhow::Result<VaultContext> {
        VaultContext::load(self.root.as_deref(), self.config.as_deref())
    }
}

/// Why a command stopped before doing its work.
pub enum Refusal {
    Denied,
    Interrupted,
}

impl From<Refusal> for ExitCode {
    fn from(refusal: Refusal) -> Self {
        match refusal {
            Refusal::Denied => {
                render::render_denied();
                ExitCode::from(EXIT_DENIED)
            }
            Refusal::Interrupted => {
                render::render_aborted();
                ExitCode::from(EXIT_INTERRUPTED)
            }
        }
    }
}

/// Read the passkey off the async runtime.
pub async fn ask_passkey(options: &Options) -> anyhow::Result<Result<SecretString, Refusal>> {
    let from_stdin = options.passkey_stdin;
    let read = tokio::task::spawn_blocking(move || prompt::read_passkey("Passkey:", from_stdin))
        .await?;

    match read {
        Ok(passkey) => Ok(Ok(passkey)),
        Err(PromptError::Interrupted) => Ok(Err(Refusal::Interrupted)),
        Err(e) => Err(e.into()),
    }
}

/// Prompt for the passkey and run the owner check.
///
/// Denial and abort come back as a [`Refusal`]; a missing fragment or any
/// other failure is an error.
pub async fn authorize(
    options: &Options,
    ctx: &VaultContext,
) -> anyhow::Result<Result<Grant, Refusal>> {
    let passkey = match ask_passkey(options).await? {
        Ok(passkey) => passkey,
        Err(refusal) => return Ok(Err(refusal)),
    };

    let validator = ctx.validator();
    let result = tokio::task::spawn_blocking(move || validator.authorize(&passkey)).await?;

    match result {
        Ok(grant) => {
            render::render_granted(grant.enrolled);
            Ok(Ok(grant))
        }
        Err(VaultError::AccessDenied) => Ok(Err(Refusal::Denied)),
        Err(e) => Err(e.into()),
    }
}
