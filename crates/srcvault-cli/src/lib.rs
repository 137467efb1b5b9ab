//! srcvault command-line interface.

pub mod commands;
pub mod context;
pub mod prompt;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use srcvault_core::env::vars;
use srcvault_tree::Direction;

/// srcvault - owner-gated source vault
#[derive(Parser)]
#[command(name = "srcvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Root of the managed tree (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to config file (defaults to <root>/srcvault.json5)
    #[arg(short, long, global = true, env = vars::SRCVAULT_CONFIG)]
    pub config: Option<PathBuf>,

    /// Read the passkey as a single line from stdin
    #[arg(long, global = true)]
    pub passkey_stdin: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the chosen verbosity. `RUST_LOG` wins when set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "srcvault=warn",
            1 => "srcvault=info",
            _ => "srcvault=debug",
        }
    }

    fn options(&self) -> commands::Options {
        commands::Options {
            root: self.root.clone(),
            config: self.config.clone(),
            passkey_stdin: self.passkey_stdin,
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a command once the owner is verified
    Gate(commands::gate::GateArgs),

    /// Encrypt the source zone of the tree
    Lock,

    /// Decrypt every encrypted file in the tree
    Unlock,

    /// Recover from fingerprint drift and unlock the tree
    Recover,

    /// Count managed files by state
    Status(commands::status::StatusArgs),

    /// Run diagnostics
    Doctor,

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let options = cli.options();

    match cli.command {
        Commands::Gate(args) => commands::gate::run(&options, args).await,
        Commands::Lock => commands::vault::run(&options, Direction::Lock).await,
        Commands::Unlock => commands::vault::run(&options, Direction::Unlock).await,
        Commands::Recover => commands::recover::run(&options).await,
        Commands::Status(args) => commands::status::run(&options, args).await,
        Commands::Doctor => commands::doctor::run(&options).await,
        Commands::Version => {
            println!("srcvault {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}
