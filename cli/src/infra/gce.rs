//! Infrastructure implementation of the `RemoteService` port.
//!
//! `GceRemoteService<R>` sees the LTM as a GCE instance: status and abort go
//! through `gcloud compute instances`, launch through the xfstests launcher.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RemoteService, ServiceState};
use crate::domain::config::ServiceConfig;
use crate::infra::command_runner::check_status;

/// Substring gcloud prints on stderr when the instance does not exist.
const NOT_FOUND_MARKER: &str = "was not found";

/// Infrastructure adapter that routes LTM lifecycle calls through a
/// `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct GceRemoteService<R: CommandRunner> {
    runner: R,
    project: Option<String>,
    zone: Option<String>,
    launcher: String,
}

impl<R: CommandRunner> GceRemoteService<R> {
    pub fn new(runner: R, settings: &ServiceConfig) -> Self {
        Self {
            runner,
            project: settings.project.clone(),
            zone: settings.zone.clone(),
            launcher: settings.launcher.clone(),
        }
    }

    fn instance_args<'a>(&'a self, verb: &'a str, name: &'a str) -> Vec<&'a str> {
        let mut args = vec!["compute", "instances", verb, name];
        if let Some(project) = &self.project {
            args.extend(["--project", project.as_str()]);
        }
        if let Some(zone) = &self.zone {
            args.extend(["--zone", zone.as_str()]);
        }
        args
    }
}

impl<R: CommandRunner> RemoteService for GceRemoteService<R> {
    async fn describe(&self, name: &str) -> Result<ServiceState> {
        let mut args = self.instance_args("describe", name);
        args.push("--format=value(status)");
        let output = self
            .runner
            .run("gcloud", &args)
            .await
            .context("gcloud compute instances describe")?;

        if output.status.success() {
            let status = String::from_utf8_lossy(&output.stdout);
            tracing::debug!(service = name, status = %status.trim(), "instance present");
            return Ok(ServiceState::Running);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains(NOT_FOUND_MARKER) {
            return Ok(ServiceState::Absent);
        }
        anyhow::bail!("gcloud compute instances describe failed: {}", stderr.trim())
    }

    async fn abort(&self, name: &str) -> Result<()> {
        let mut args = self.instance_args("delete", name);
        args.extend(["--quiet", "--async"]);
        let output = self
            .runner
            .run("gcloud", &args)
            .await
            .context("gcloud compute instances delete")?;
        check_status("gcloud compute instances delete", &output)
    }

    async fn launch(&self, name: &str) -> Result<()> {
        tracing::info!(service = name, launcher = %self.launcher, "launching test manager");
        let output = self
            .runner
            .run(&self.launcher, &["launch-ltm"])
            .await
            .with_context(|| format!("{} launch-ltm", self.launcher))?;
        check_status(&self.launcher, &output)
    }
}
