//! Application service: the handoff use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All remote I/O is routed through injected port traits.
//!
//! Steps run strictly in order and the first failure ends the run:
//!
//! 1. coordinate shutdown of any prior LTM instance;
//! 2. publish the local kernels;
//! 3. build the batch descriptor from the published references;
//! 4. write the descriptor to a scratch file and publish it;
//! 5. launch a fresh LTM.
//!
//! The scratch file is created before step 1 and removed when the run ends,
//! whichever way it ends.

use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::application::ports::{BlobStore, ProgressReporter, RemoteService};
use crate::application::services::artifacts::ArtifactPublisher;
use crate::application::services::shutdown::{PollPolicy, ShutdownCoordinator, ShutdownOutcome};
use crate::domain::batch::{self, BatchDescriptor, PinnedSource};
use crate::domain::{Architecture, HandoffError, HandoffFailure, KernelArtifact, Step};

/// Object path of the batch descriptor, relative to the bucket root.
pub const BATCH_OBJECT: &str = "ltm-batch/handoff.batch";

pub struct HandoffOptions<'a> {
    /// Logical name of the LTM instance.
    pub service_name: &'a str,
    pub pinned: PinnedSource<'a>,
    /// Directory the descriptor scratch file is created in.
    pub scratch_dir: &'a Path,
    pub poll: PollPolicy,
    pub dry_run: bool,
}

/// What a completed run did.
#[derive(Debug)]
pub struct HandoffOutcome {
    pub shutdown: ShutdownOutcome,
    pub descriptor: BatchDescriptor,
    /// Where the descriptor was (or under dry-run, would have been) published.
    pub descriptor_uri: String,
    pub dry_run: bool,
}

/// Hand a fresh batch over to the LTM.
///
/// # Errors
///
/// Returns the step that failed together with its typed error. A failure in
/// `Launching` leaves the descriptor published.
pub async fn run(
    service: &impl RemoteService,
    store: &impl BlobStore,
    reporter: &impl ProgressReporter,
    artifacts: &[KernelArtifact],
    opts: HandoffOptions<'_>,
) -> Result<HandoffOutcome, HandoffFailure> {
    let HandoffOptions {
        service_name,
        pinned,
        scratch_dir,
        poll,
        dry_run,
    } = opts;
    let fail = |step: Step| move |error: HandoffError| HandoffFailure { step, error };

    // Dropping the guard deletes the file on every return path below.
    let mut scratch = tempfile::Builder::new()
        .prefix("ltm-batch-")
        .suffix(".batch")
        .tempfile_in(scratch_dir)
        .map_err(|e| HandoffError::Publish {
            object: "batch descriptor".to_string(),
            reason: format!("cannot create scratch file in {}: {e}", scratch_dir.display()),
        })
        .map_err(fail(Step::PublishingDescriptor))?;
    tracing::debug!(path = %scratch.path().display(), "descriptor scratch file created");

    enter(Step::CoordinatingShutdown);
    let shutdown = ShutdownCoordinator::new(service, reporter, poll)
        .ensure_stopped(service_name, dry_run)
        .await
        .map_err(fail(Step::CoordinatingShutdown))?;

    enter(Step::PublishingArtifacts);
    let published = ArtifactPublisher::new(store, reporter, dry_run)
        .publish_all(artifacts)
        .await
        .map_err(fail(Step::PublishingArtifacts))?;

    enter(Step::BuildingDescriptor);
    let descriptor = batch::build(&Architecture::ALL, &published, pinned);
    tracing::info!(jobs = descriptor.len(), "batch descriptor built");
    for job in &descriptor {
        tracing::info!(%job, "descriptor entry");
    }

    enter(Step::PublishingDescriptor);
    let descriptor_uri = format!("{}/{BATCH_OBJECT}", store.bucket_root());
    write_descriptor(&mut scratch, &descriptor).map_err(fail(Step::PublishingDescriptor))?;
    if dry_run {
        reporter.step(&format!(
            "[dry-run] would publish {} job(s) to {descriptor_uri}",
            descriptor.len()
        ));
    } else {
        reporter.step(&format!("publishing batch to {descriptor_uri}..."));
        store
            .put_object(BATCH_OBJECT, scratch.path())
            .await
            .map_err(|e| HandoffError::Publish {
                object: BATCH_OBJECT.to_string(),
                reason: format!("{e:#}"),
            })
            .map_err(fail(Step::PublishingDescriptor))?;
        reporter.success(&format!("batch of {} job(s) published", descriptor.len()));
    }

    enter(Step::Launching);
    if dry_run {
        reporter.step(&format!("[dry-run] would launch '{service_name}'"));
    } else {
        reporter.step(&format!("launching '{service_name}'..."));
        service
            .launch(service_name)
            .await
            .map_err(|e| HandoffError::Launch {
                service: service_name.to_string(),
                reason: format!("{e:#}"),
            })
            .map_err(fail(Step::Launching))?;
        reporter.success(&format!("'{service_name}' launched"));
    }

    Ok(HandoffOutcome {
        shutdown,
        descriptor,
        descriptor_uri,
        dry_run,
    })
}

fn enter(step: Step) {
    tracing::info!(%step, n = step.number(), of = Step::ALL.len(), "handoff step");
}

fn write_descriptor(
    scratch: &mut NamedTempFile,
    descriptor: &BatchDescriptor,
) -> Result<(), HandoffError> {
    scratch
        .write_all(descriptor.render().as_bytes())
        .and_then(|()| scratch.flush())
        .map_err(|e| HandoffError::Publish {
            object: "batch descriptor".to_string(),
            reason: format!("cannot write {}: {e}", scratch.path().display()),
        })
}
