//! Infrastructure implementation of the `BlobStore` port on top of `gsutil`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{BlobStore, CommandRunner};
use crate::infra::command_runner::{DEFAULT_UPLOAD_TIMEOUT, check_status};

/// Uploads objects into one GCS bucket by shelling out to `gsutil cp`.
pub struct GsutilBlobStore<R: CommandRunner> {
    runner: R,
    bucket: String,
    upload_timeout: Duration,
}

impl<R: CommandRunner> GsutilBlobStore<R> {
    /// `bucket` is the bare bucket name, without `gs://`.
    pub fn new(runner: R, bucket: &str) -> Self {
        Self {
            runner,
            bucket: bucket.to_string(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl<R: CommandRunner> BlobStore for GsutilBlobStore<R> {
    fn bucket_root(&self) -> String {
        format!("gs://{}", self.bucket)
    }

    async fn put_object(&self, object: &str, local: &Path) -> Result<String> {
        let uri = format!("{}/{}", self.bucket_root(), object.trim_start_matches('/'));
        let src = local
            .to_str()
            .with_context(|| format!("{} is not valid UTF-8", local.display()))?;
        let output = self
            .runner
            .run_with_timeout("gsutil", &["-q", "cp", src, &uri], self.upload_timeout)
            .await
            .with_context(|| format!("gsutil cp {src} {uri}"))?;
        check_status("gsutil cp", &output)?;
        Ok(uri)
    }
}
