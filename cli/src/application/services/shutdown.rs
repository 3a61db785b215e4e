//! Shutdown coordination with a prior LTM instance.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! The only evidence that the old instance is gone is a status query that
//! reports it absent. Until then it may still be driving test VMs, so the
//! poll loop has no upper bound: a new batch is never published next to a
//! live manager.

use std::time::Duration;

use crate::application::ports::{ProgressReporter, RemoteService, ServiceState};
use crate::domain::HandoffError;

/// Timing of the grace window and the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two status queries while waiting for shutdown.
    pub interval: Duration,
    /// Window in which the operator can still cancel before the abort.
    pub grace_period: Duration,
    /// Emit one heartbeat after this many consecutive "still running" polls.
    pub heartbeat_every: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            grace_period: Duration::from_secs(3),
            heartbeat_every: 10,
        }
    }
}

/// How `ensure_stopped` reached the "no prior instance" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Nothing was running; no abort was issued.
    AlreadyAbsent,
    /// An instance was running but dry-run suppressed the abort.
    AbortSkipped,
    /// The instance was aborted and observed absent after `polls` queries.
    Stopped { polls: u64 },
}

/// Drives a running LTM instance to the absent state.
pub struct ShutdownCoordinator<'a, S, R> {
    service: &'a S,
    reporter: &'a R,
    policy: PollPolicy,
}

impl<'a, S: RemoteService, R: ProgressReporter> ShutdownCoordinator<'a, S, R> {
    pub fn new(service: &'a S, reporter: &'a R, policy: PollPolicy) -> Self {
        Self {
            service,
            reporter,
            policy,
        }
    }

    /// Make sure no instance named `name` is running.
    ///
    /// Returns only once the instance is confirmed absent, or immediately
    /// after the (suppressed) abort under `dry_run`.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::Query` on the first failed status query,
    /// `HandoffError::Abort` if the abort request is refused, and
    /// `HandoffError::Cancelled` if the operator interrupts the grace window.
    pub async fn ensure_stopped(
        &self,
        name: &str,
        dry_run: bool,
    ) -> Result<ShutdownOutcome, HandoffError> {
        let ctrl_c = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler: the window cannot be interrupted.
                std::future::pending::<()>().await;
            }
        };
        self.ensure_stopped_unless(name, dry_run, ctrl_c).await
    }

    /// `ensure_stopped` with the grace window interrupted by `cancel`
    /// instead of Ctrl-C.
    ///
    /// # Errors
    ///
    /// As `ensure_stopped`; `HandoffError::Cancelled` when `cancel` completes
    /// inside the grace window.
    pub async fn ensure_stopped_unless(
        &self,
        name: &str,
        dry_run: bool,
        cancel: impl Future<Output = ()>,
    ) -> Result<ShutdownOutcome, HandoffError> {
        if self.query(name).await? == ServiceState::Absent {
            tracing::info!(service = name, "no prior instance running");
            return Ok(ShutdownOutcome::AlreadyAbsent);
        }

        self.reporter.warn(&format!(
            "'{name}' is running; aborting it will kill any test VMs it still manages"
        ));
        self.grace_window(name, cancel).await?;

        if dry_run {
            tracing::info!(service = name, "dry-run: abort suppressed");
            self.reporter
                .step(&format!("[dry-run] would abort '{name}' and wait for it to exit"));
            return Ok(ShutdownOutcome::AbortSkipped);
        }

        self.reporter.step(&format!("aborting '{name}'..."));
        self.service
            .abort(name)
            .await
            .map_err(|e| HandoffError::Abort {
                service: name.to_string(),
                reason: format!("{e:#}"),
            })?;

        let polls = self.wait_absent(name).await?;
        self.reporter.success(&format!("'{name}' has exited"));
        Ok(ShutdownOutcome::Stopped { polls })
    }

    async fn query(&self, name: &str) -> Result<ServiceState, HandoffError> {
        self.service
            .describe(name)
            .await
            .map_err(|e| HandoffError::Query {
                service: name.to_string(),
                reason: format!("{e:#}"),
            })
    }

    async fn grace_window(
        &self,
        name: &str,
        cancel: impl Future<Output = ()>,
    ) -> Result<(), HandoffError> {
        if self.policy.grace_period.is_zero() {
            return Ok(());
        }
        self.reporter.step(&format!(
            "press Ctrl-C within {}s to cancel",
            self.policy.grace_period.as_secs()
        ));
        tokio::select! {
            () = tokio::time::sleep(self.policy.grace_period) => Ok(()),
            () = cancel => {
                tracing::warn!(service = name, "cancelled during grace window");
                Err(HandoffError::Cancelled { service: name.to_string() })
            }
        }
    }

    /// Poll until `name` is absent and return the number of queries issued.
    async fn wait_absent(&self, name: &str) -> Result<u64, HandoffError> {
        let heartbeat_every = self.policy.heartbeat_every.max(1);
        let mut polls = 0u64;
        loop {
            tokio::time::sleep(self.policy.interval).await;
            polls += 1;
            match self.query(name).await? {
                ServiceState::Absent => {
                    tracing::info!(service = name, polls, "prior instance exited");
                    return Ok(polls);
                }
                ServiceState::Running => {
                    tracing::debug!(service = name, polls, "still running");
                    if polls % heartbeat_every == 0 {
                        self.reporter.step(&format!(
                            "still waiting for '{name}' to exit ({polls} checks so far)"
                        ));
                    }
                }
            }
        }
    }
}
