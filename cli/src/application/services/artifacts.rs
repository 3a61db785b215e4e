//! Kernel artifact publishing.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{BlobStore, ProgressReporter};
use crate::domain::{Architecture, HandoffError, KernelArtifact, PublishedArtifactRef};

/// Uploads kernel packages under their deterministic per-architecture names.
///
/// Stateless: the same artifact published twice overwrites the same object.
pub struct ArtifactPublisher<'a, B, R> {
    store: &'a B,
    reporter: &'a R,
    dry_run: bool,
}

impl<'a, B: BlobStore, R: ProgressReporter> ArtifactPublisher<'a, B, R> {
    pub fn new(store: &'a B, reporter: &'a R, dry_run: bool) -> Self {
        Self {
            store,
            reporter,
            dry_run,
        }
    }

    /// Publish one artifact.
    ///
    /// Returns `None` when the artifact does not exist locally. Under dry-run
    /// the upload is skipped but the reference is still returned.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::Publish` if the upload fails.
    pub async fn publish(
        &self,
        artifact: &KernelArtifact,
    ) -> Result<Option<PublishedArtifactRef>, HandoffError> {
        let arch = artifact.architecture;
        if !artifact.exists {
            tracing::info!(
                %arch,
                path = %artifact.local_path.display(),
                "no local kernel, skipping custom-kernel job"
            );
            return Ok(None);
        }

        let object = arch.kernel_object_name();
        let published = PublishedArtifactRef::under(&self.store.bucket_root(), arch);

        if self.dry_run {
            tracing::info!(%arch, uri = %published.remote_uri, "dry-run: upload suppressed");
            self.reporter.step(&format!(
                "[dry-run] would upload {} to {}",
                artifact.local_path.display(),
                published.remote_uri
            ));
            return Ok(Some(published));
        }

        self.reporter
            .step(&format!("uploading {arch} kernel to {}...", published.remote_uri));
        let uri = self
            .store
            .put_object(&object, &artifact.local_path)
            .await
            .map_err(|e| HandoffError::Publish {
                object: object.clone(),
                reason: format!("{e:#}"),
            })?;
        tracing::debug!(%arch, %uri, "kernel uploaded");
        self.reporter.success(&format!("{arch} kernel uploaded"));
        Ok(Some(published))
    }

    /// Publish every artifact in descriptor order, collecting the references
    /// of those that exist.
    ///
    /// # Errors
    ///
    /// Stops at the first failed upload.
    pub async fn publish_all(
        &self,
        artifacts: &[KernelArtifact],
    ) -> Result<Vec<PublishedArtifactRef>, HandoffError> {
        let mut published = Vec::new();
        for arch in Architecture::ALL {
            for artifact in artifacts.iter().filter(|a| a.architecture == arch) {
                if let Some(r) = self.publish(artifact).await? {
                    published.push(r);
                }
            }
        }
        Ok(published)
    }
}
