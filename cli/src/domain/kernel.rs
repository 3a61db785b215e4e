//! Kernel architectures and the artifacts built for them.
//!
//! Pure types only. Existence of a local artifact is checked by
//! `crate::infra::fs` and recorded here as a plain flag.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// CPU architecture a kernel is built for.
///
/// The declaration order is the order jobs appear in a batch descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
}

impl Architecture {
    /// Every supported architecture, in descriptor order.
    pub const ALL: [Architecture; 2] = [Architecture::Amd64, Architecture::Arm64];

    /// The architecture the LTM assumes when a job carries no `--arch` flag.
    pub const DEFAULT: Architecture = Architecture::Amd64;

    /// Lowercase name used on the command line and in object names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }

    /// Whether a job for this architecture must name it explicitly.
    #[must_use]
    pub fn needs_arch_flag(self) -> bool {
        self != Self::DEFAULT
    }

    /// Deterministic blob name for this architecture's kernel package.
    #[must_use]
    pub fn kernel_object_name(self) -> String {
        format!("kernel-{}.deb", self.as_str())
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A locally built kernel package for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelArtifact {
    pub architecture: Architecture,
    pub local_path: PathBuf,
    /// `false` when nothing was found at `local_path` for this run.
    pub exists: bool,
}

/// Address of a kernel package that has been (or, under dry-run, would be)
/// uploaded to the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifactRef {
    pub architecture: Architecture,
    pub remote_uri: String,
}

impl PublishedArtifactRef {
    /// Compose the reference for `architecture` under `bucket_root`.
    #[must_use]
    pub fn under(bucket_root: &str, architecture: Architecture) -> Self {
        Self {
            architecture,
            remote_uri: format!(
                "{}/{}",
                bucket_root.trim_end_matches('/'),
                architecture.kernel_object_name()
            ),
        }
    }
}
