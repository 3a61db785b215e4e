//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Prefix services put on actions they suppressed under dry-run.
const DRY_RUN_TAG: &str = "[dry-run]";

/// Suffix of a step that stays in progress until the next event.
const ONGOING_SUFFIX: &str = "...";

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` to stderr (never suppressed)
///
/// On a TTY a step ending in `...` runs as a spinner until the next event;
/// a following `success()` turns it into the `✓` line. A leading `[dry-run]`
/// tag is highlighted.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    pub(crate) active: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: RefCell::new(None),
        }
    }

    pub(crate) fn highlight(&self, message: &str) -> String {
        match message.strip_prefix(DRY_RUN_TAG) {
            Some(rest) => format!("{}{rest}", DRY_RUN_TAG.style(self.ctx.styles.dry_run)),
            None => message.to_string(),
        }
    }

    /// Whether `message` would be rendered as a spinner.
    pub(crate) fn spins(&self, message: &str) -> bool {
        self.ctx.is_tty && !self.ctx.quiet && message.ends_with(ONGOING_SUFFIX)
    }

    /// Freeze the running spinner, if any, as a plain step line.
    fn settle(&self) {
        if let Some(pb) = self.active.borrow_mut().take() {
            let arrow = format!("{}", "→".style(self.ctx.styles.step));
            let msg = pb.message();
            progress::finish_with(&pb, &arrow, &msg);
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.settle();
        if self.ctx.quiet {
            return;
        }
        let message = self.highlight(message);
        if self.spins(&message) {
            *self.active.borrow_mut() = Some(progress::spinner(&message));
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.step));
        }
    }

    fn success(&self, message: &str) {
        let active = self.active.borrow_mut().take();
        if let Some(pb) = active {
            let check = format!("{}", "✓".style(self.ctx.styles.success));
            progress::finish_with(&pb, &check, message);
        } else if !self.ctx.quiet {
            println!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    // Precedes an irreversible abort, so quiet mode keeps it.
    fn warn(&self, message: &str) {
        self.settle();
        eprintln!("  {} {message}", "!".style(self.ctx.styles.warning));
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.settle();
    }
}
