//! Domain types and validators for handoff configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::batch::DEFAULT_KCS_REPO;
use crate::domain::error::ConfigError;
use crate::domain::kernel::Architecture;

// ── Constants ────────────────────────────────────────────────────────────────

/// Logical name of the LTM instance.
pub const DEFAULT_SERVICE_NAME: &str = "xfstests-ltm";

/// Program that knows how to start a fresh LTM.
pub const DEFAULT_LAUNCHER: &str = "gce-xfstests";

/// Commit the pinned-source jobs build when none is configured.
pub const DEFAULT_KCS_COMMIT: &str = "master";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.ltm-handoff/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HandoffConfig {
    /// The remote test manager.
    pub service: ServiceConfig,
    /// Blob store holding kernels and the batch descriptor.
    pub gcs: GcsConfig,
    /// Upstream source for the pinned-source jobs.
    pub kcs: KcsConfig,
    /// Local kernel packages, one per architecture.
    pub kernels: KernelPaths,
    /// Directory for the descriptor temp file. System temp dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub launcher: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            project: None,
            zone: None,
            launcher: DEFAULT_LAUNCHER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GcsConfig {
    /// Bucket name, without the `gs://` scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KcsConfig {
    pub repo: String,
    pub commit: String,
}

impl Default for KcsConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_KCS_REPO.to_string(),
            commit: DEFAULT_KCS_COMMIT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelPaths {
    pub amd64: PathBuf,
    pub arm64: PathBuf,
}

impl Default for KernelPaths {
    fn default() -> Self {
        Self {
            amd64: PathBuf::from("kernel-amd64.deb"),
            arm64: PathBuf::from("kernel-arm64.deb"),
        }
    }
}

impl KernelPaths {
    #[must_use]
    pub fn path_for(&self, arch: Architecture) -> &Path {
        match arch {
            Architecture::Amd64 => &self.amd64,
            Architecture::Arm64 => &self.arm64,
        }
    }
}

impl HandoffConfig {
    /// The configured bucket, checked for shape.
    ///
    /// # Errors
    ///
    /// Returns an error if no bucket is set or it is not a bare bucket name.
    pub fn bucket(&self) -> Result<&str> {
        let bucket = self
            .gcs
            .bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                key: "gcs.bucket".to_string(),
            })?;
        if bucket.starts_with("gs://") || bucket.contains('/') {
            return Err(ConfigError::InvalidValue {
                key: "gcs.bucket".to_string(),
                value: bucket.to_string(),
                hint: "Use the bare bucket name, e.g. my-bucket".to_string(),
            }
            .into());
        }
        Ok(bucket)
    }

    /// Validates every setting a handoff run depends on.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing setting.
    pub fn validate(&self) -> Result<()> {
        self.bucket()?;
        require_non_empty("service.name", &self.service.name)?;
        require_non_empty("service.launcher", &self.service.launcher)?;
        require_non_empty("kcs.repo", &self.kcs.repo)?;
        require_non_empty("kcs.commit", &self.kcs.commit)?;
        Ok(())
    }
}

fn require_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing {
            key: key.to_string(),
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
