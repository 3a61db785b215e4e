//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once in `Cli::run()` from the top-level flags and
//! the loaded configuration, and handed to the command as `&AppContext`.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::HandoffConfig;
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Report remote actions instead of performing them.
    pub dry_run: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Validated handoff configuration.
    pub config: HandoffConfig,
    /// When `true`, no remote state is changed.
    pub dry_run: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and a config store.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if a
    /// required setting is missing or invalid.
    pub fn new(flags: &AppFlags, store: &impl ConfigStore) -> Result<Self> {
        let config = store.load()?;
        config.validate()?;
        tracing::debug!(
            service = %config.service.name,
            dry_run = flags.dry_run,
            "configuration loaded"
        );

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config,
            dry_run: flags.dry_run,
        })
    }
}
