//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::HandoffConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Remote service state as observed by a single status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// No instance with the logical name exists.
    Absent,
    /// An instance exists and may still be managing test VMs.
    Running,
}

// ── Remote Service Port ───────────────────────────────────────────────────────

/// The long-running test manager, seen as a black box.
///
/// Every call is a fresh remote round trip; implementations must not cache.
#[allow(async_fn_in_trait)]
pub trait RemoteService {
    /// Query whether the named instance currently exists.
    ///
    /// An `Err` means the query itself failed, not that the service is down.
    async fn describe(&self, name: &str) -> Result<ServiceState>;
    /// Ask the named instance to shut down. Returns once the request is
    /// accepted; shutdown completes asynchronously.
    async fn abort(&self, name: &str) -> Result<()>;
    /// Start a fresh instance that picks up the published batch.
    async fn launch(&self, name: &str) -> Result<()>;
}

// ── Blob Store Port ───────────────────────────────────────────────────────────

/// Key-value object storage for kernels and batch descriptors.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// URI every object path is resolved against, e.g. `gs://bucket`.
    fn bucket_root(&self) -> String;
    /// Upload `local` to `object` under the bucket root, replacing any
    /// existing object, and return its URI.
    async fn put_object(&self, object: &str, local: &Path) -> Result<String>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading the handoff configuration.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<HandoffConfig>;
    /// Location the configuration is read from.
    fn path(&self) -> Result<PathBuf>;
}
