//! `ltm-handoff`: replace the running LTM with one working on a fresh batch.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::handoff::{self, HandoffOptions, HandoffOutcome};
use crate::application::services::shutdown::{PollPolicy, ShutdownOutcome};
use crate::domain::PinnedSource;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::locate_kernels;
use crate::infra::gce::GceRemoteService;
use crate::infra::gcs::GsutilBlobStore;
use crate::output::{OutputContext, TerminalReporter};

/// Run the handoff against the configured GCE project and bucket.
///
/// # Errors
///
/// Returns an error naming the failed step when the handoff stops early.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let ctx = &app.output;
    let config = &app.config;
    let bucket = config.bucket()?;

    let service = GceRemoteService::new(
        TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT),
        &config.service,
    );
    let store = GsutilBlobStore::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT), bucket);
    let reporter = TerminalReporter::new(ctx);

    let artifacts = locate_kernels(&config.kernels);
    let scratch_dir = config
        .scratch_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    ctx.header(if app.dry_run {
        "LTM handoff (dry run)"
    } else {
        "LTM handoff"
    });
    ctx.kv("service:", &config.service.name);
    ctx.kv("bucket: ", &format!("gs://{bucket}"));
    for artifact in &artifacts {
        let state = if artifact.exists { "" } else { " (missing, skipped)" };
        ctx.kv(
            &format!("{}:  ", artifact.architecture),
            &format!("{}{state}", artifact.local_path.display()),
        );
    }

    let opts = HandoffOptions {
        service_name: &config.service.name,
        pinned: PinnedSource {
            repo: &config.kcs.repo,
            commit: &config.kcs.commit,
        },
        scratch_dir: &scratch_dir,
        poll: PollPolicy::default(),
        dry_run: app.dry_run,
    };

    let outcome = match handoff::run(&service, &store, &reporter, &artifacts, opts).await {
        Ok(outcome) => outcome,
        Err(failure) => {
            let step = failure.step;
            return Err(anyhow::Error::new(failure.error)
                .context(format!("handoff failed while {step}")));
        }
    };

    report(ctx, &config.service.name, &outcome);
    Ok(ExitCode::SUCCESS)
}

fn report(ctx: &OutputContext, service_name: &str, outcome: &HandoffOutcome) {
    match outcome.shutdown {
        ShutdownOutcome::AlreadyAbsent => {
            ctx.info(&format!("'{service_name}' was not running."));
        }
        ShutdownOutcome::AbortSkipped => {}
        ShutdownOutcome::Stopped { polls } => {
            ctx.info(&format!("'{service_name}' exited after {polls} check(s)."));
        }
    }

    ctx.header(&format!("Batch ({} job(s))", outcome.descriptor.len()));
    for job in &outcome.descriptor {
        ctx.line(&job.to_string());
    }

    if outcome.dry_run {
        ctx.info("Dry run: no remote state was changed.");
    } else {
        ctx.success(&format!(
            "Handed off to '{service_name}'. Batch at {}",
            outcome.descriptor_uri
        ));
    }
}
