//! Shared test doubles for service tests.
//!
//! Each fake records the calls it receives so tests can assert on what a
//! service did (and did not) ask of the outside world.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use super::shutdown::PollPolicy;
use crate::application::ports::{BlobStore, ProgressReporter, RemoteService, ServiceState};

/// Poll policy without any waiting.
pub fn instant_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::ZERO,
        grace_period: Duration::ZERO,
        heartbeat_every: 10,
    }
}

// ── Remote service ───────────────────────────────────────────────────────────

/// Answers `describe` from a script; `Absent` once the script runs out.
pub struct ScriptedService {
    script: RefCell<VecDeque<Result<ServiceState, &'static str>>>,
    describes: Cell<u64>,
    aborts: Cell<u64>,
    aborted_at: Cell<Option<tokio::time::Instant>>,
    launches: Cell<u64>,
    refuse_abort: bool,
    refuse_launch: bool,
}

impl ScriptedService {
    pub fn new(script: Vec<Result<ServiceState, &'static str>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            describes: Cell::new(0),
            aborts: Cell::new(0),
            aborted_at: Cell::new(None),
            launches: Cell::new(0),
            refuse_abort: false,
            refuse_launch: false,
        }
    }

    pub fn refusing_abort(mut self) -> Self {
        self.refuse_abort = true;
        self
    }

    pub fn refusing_launch(mut self) -> Self {
        self.refuse_launch = true;
        self
    }

    pub fn describe_calls(&self) -> u64 {
        self.describes.get()
    }

    pub fn abort_calls(&self) -> u64 {
        self.aborts.get()
    }

    /// When the last abort request arrived, on the tokio clock.
    pub fn abort_time(&self) -> Option<tokio::time::Instant> {
        self.aborted_at.get()
    }

    pub fn launch_calls(&self) -> u64 {
        self.launches.get()
    }
}

impl RemoteService for ScriptedService {
    async fn describe(&self, _: &str) -> Result<ServiceState> {
        self.describes.set(self.describes.get() + 1);
        match self.script.borrow_mut().pop_front() {
            Some(Ok(state)) => Ok(state),
            Some(Err(msg)) => anyhow::bail!(msg),
            None => Ok(ServiceState::Absent),
        }
    }

    async fn abort(&self, _: &str) -> Result<()> {
        self.aborts.set(self.aborts.get() + 1);
        self.aborted_at.set(Some(tokio::time::Instant::now()));
        if self.refuse_abort {
            anyhow::bail!("abort refused");
        }
        Ok(())
    }

    async fn launch(&self, _: &str) -> Result<()> {
        self.launches.set(self.launches.get() + 1);
        if self.refuse_launch {
            anyhow::bail!("launch refused");
        }
        Ok(())
    }
}

// ── Blob store ───────────────────────────────────────────────────────────────

/// Records uploads; fails any upload whose object name contains `fail_on`.
#[derive(Default)]
pub struct RecordingStore {
    uploads: RefCell<Vec<(String, PathBuf, String)>>,
    fail_on: Option<&'static str>,
}

impl RecordingStore {
    pub fn failing_on(object: &'static str) -> Self {
        Self {
            uploads: RefCell::default(),
            fail_on: Some(object),
        }
    }

    /// `(object, local path, content at upload time)` per successful upload.
    pub fn uploads(&self) -> Vec<(String, PathBuf, String)> {
        self.uploads.borrow().clone()
    }
}

impl BlobStore for RecordingStore {
    fn bucket_root(&self) -> String {
        "gs://test-bucket".to_string()
    }

    async fn put_object(&self, object: &str, local: &Path) -> Result<String> {
        if self.fail_on.is_some_and(|f| object.contains(f)) {
            anyhow::bail!("upload of {object} rejected");
        }
        let content = std::fs::read_to_string(local).unwrap_or_default();
        self.uploads
            .borrow_mut()
            .push((object.to_string(), local.to_path_buf(), content));
        Ok(format!("{}/{object}", self.bucket_root()))
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    steps: RefCell<Vec<String>>,
    successes: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn steps(&self) -> Vec<String> {
        self.steps.borrow().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.steps.borrow_mut().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}
