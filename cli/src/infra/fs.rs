//! Local filesystem checks for kernel artifacts.

use std::path::Path;

use crate::domain::{Architecture, KernelArtifact};
use crate::domain::config::KernelPaths;

/// Record whether a regular file exists at `path` for `architecture`.
#[must_use]
pub fn locate_kernel(architecture: Architecture, path: &Path) -> KernelArtifact {
    KernelArtifact {
        architecture,
        local_path: path.to_path_buf(),
        exists: path.is_file(),
    }
}

/// Locate every supported architecture, in descriptor order.
#[must_use]
pub fn locate_kernels(paths: &KernelPaths) -> Vec<KernelArtifact> {
    Architecture::ALL
        .into_iter()
        .map(|arch| locate_kernel(arch, paths.path_for(arch)))
        .collect()
}
