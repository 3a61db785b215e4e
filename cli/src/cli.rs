//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::infra::config::YamlConfigStore;

/// Hand a fresh test batch over to the xfstests long-term manager
///
/// Stops the running manager, uploads the local kernels, publishes a new
/// batch descriptor and launches a manager that picks it up.
#[derive(Parser)]
#[command(name = "ltm-handoff", version)]
pub struct Cli {
    /// Report every action without aborting, uploading or launching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,
}

impl Cli {
    /// Execute the handoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable or any handoff step
    /// fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            dry_run,
            quiet,
            no_color,
        } = self;
        let flags = AppFlags {
            no_color,
            quiet,
            dry_run,
        };
        let app = AppContext::new(&flags, &YamlConfigStore::from_env())?;
        commands::handoff::run(&app).await
    }
}
