//! Batch descriptor construction.
//!
//! A batch descriptor is the ordered list of `ltm` job lines the test manager
//! works through. The LTM consumes it as a strict queue, so the order produced
//! by [`build`] is part of the contract:
//!
//! 1. one pinned-source (KCS) job per architecture, amd64 first;
//! 2. one custom-kernel job per architecture that has a published kernel,
//!    amd64 first.
//!
//! An architecture without a published kernel only loses its custom-kernel
//! job. It always keeps its pinned-source job.

use std::fmt;

use super::kernel::{Architecture, PublishedArtifactRef};

/// Filesystem configurations every job runs against.
pub const TEST_CONFIGS: &[&str] = &["ext4/4k", "xfs/4k"];

/// Test group every job runs.
pub const TEST_GROUP: &str = "quick";

/// Upstream tree the pinned-source jobs build from by default.
pub const DEFAULT_KCS_REPO: &str =
    "https://git.kernel.org/pub/scm/linux/kernel/git/torvalds/linux.git";

/// Where a job gets the kernel under test from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// Built remotely from `repo` at `commit`.
    PinnedCommit { repo: String, commit: String },
    /// A prebuilt package already in the blob store.
    CustomKernel { uri: String },
}

/// One line of a batch descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInvocation {
    pub architecture: Architecture,
    pub source: JobSource,
}

impl JobInvocation {
    /// Space-separated tokens of the job line, in order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = vec!["ltm".to_string()];
        if self.architecture.needs_arch_flag() {
            tokens.push("--arch".to_string());
            tokens.push(self.architecture.to_string());
        }
        tokens.push("-c".to_string());
        tokens.push(TEST_CONFIGS.join(","));
        tokens.push("-g".to_string());
        tokens.push(TEST_GROUP.to_string());
        match &self.source {
            JobSource::PinnedCommit { repo, commit } => {
                tokens.extend(["--repo".to_string(), repo.clone()]);
                tokens.extend(["--commit".to_string(), commit.clone()]);
            }
            JobSource::CustomKernel { uri } => {
                tokens.extend(["--kernel".to_string(), uri.clone()]);
            }
        }
        tokens
    }

    #[must_use]
    pub fn is_pinned_source(&self) -> bool {
        matches!(self.source, JobSource::PinnedCommit { .. })
    }
}

impl fmt::Display for JobInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}

/// Upstream tree and commit used by the pinned-source jobs.
#[derive(Debug, Clone, Copy)]
pub struct PinnedSource<'a> {
    pub repo: &'a str,
    pub commit: &'a str,
}

/// Ordered sequence of job lines published as one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDescriptor {
    jobs: Vec<JobInvocation>,
}

impl BatchDescriptor {
    #[must_use]
    pub fn jobs(&self) -> &[JobInvocation] {
        &self.jobs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobInvocation> {
        self.jobs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Text form consumed by the LTM: one job per line, no header or trailer.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for job in &self.jobs {
            out.push_str(&job.to_string());
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a BatchDescriptor {
    type Item = &'a JobInvocation;
    type IntoIter = std::slice::Iter<'a, JobInvocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter()
    }
}

impl fmt::Display for BatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build the descriptor for `architectures` from the published kernels.
///
/// Input order does not matter: output always follows [`Architecture::ALL`].
/// Kernels for architectures not listed in `architectures` are ignored.
#[must_use]
pub fn build(
    architectures: &[Architecture],
    artifacts: &[PublishedArtifactRef],
    pinned: PinnedSource<'_>,
) -> BatchDescriptor {
    let selected: Vec<Architecture> = Architecture::ALL
        .into_iter()
        .filter(|arch| architectures.contains(arch))
        .collect();

    let mut jobs = Vec::with_capacity(selected.len() * 2);
    for &architecture in &selected {
        jobs.push(JobInvocation {
            architecture,
            source: JobSource::PinnedCommit {
                repo: pinned.repo.to_string(),
                commit: pinned.commit.to_string(),
            },
        });
    }
    for &architecture in &selected {
        if let Some(artifact) = artifacts.iter().find(|a| a.architecture == architecture) {
            jobs.push(JobInvocation {
                architecture,
                source: JobSource::CustomKernel {
                    uri: artifact.remote_uri.clone(),
                },
            });
        }
    }
    BatchDescriptor { jobs }
}
