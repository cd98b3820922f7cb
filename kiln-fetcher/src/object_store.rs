//! Object-storage release source.
//!
//! Keys are derived from the configured path template; existence is a HEAD
//! probe against the bucket. The wire client is behind [`ObjectStoreClient`]
//! so tests can substitute a recording fake.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use kiln_core::{LocalRelease, RemoteRelease, Requirement};
use kiln_template::PathTemplate;

use crate::error::{io_err, FetchError};
use crate::source::{
    destination, file_name_for, local_release, ReleaseSource, DEFAULT_DOWNLOAD_CONCURRENCY,
};

/// Minimal object-storage operations a release source needs.
pub trait ObjectStoreClient {
    /// `Ok(false)` only for a definite "no such key".
    fn head_object(&self, bucket: &str, key: &str) -> Result<bool, FetchError>;

    /// Stream the object into the existing file at `dest`, using up to
    /// `concurrency` parallel part requests. Returns the number of bytes
    /// written.
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &Path,
        concurrency: usize,
    ) -> Result<u64, FetchError>;

    fn put_object(&self, bucket: &str, key: &str, body: &mut dyn Read) -> Result<(), FetchError>;
}

/// Release source backed by one object-storage bucket.
pub struct ObjectStoreSource {
    id: String,
    bucket: String,
    template: PathTemplate,
    publishable: bool,
    client: Box<dyn ObjectStoreClient>,
}

impl ObjectStoreSource {
    pub fn new(
        id: impl Into<String>,
        bucket: impl Into<String>,
        template: PathTemplate,
        publishable: bool,
        client: Box<dyn ObjectStoreClient>,
    ) -> Self {
        Self {
            id: id.into(),
            bucket: bucket.into(),
            template,
            publishable,
            client,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload the file at `path` under `key` verbatim; no template involved.
    pub fn put_file(&self, key: &str, path: &Path) -> Result<(), FetchError> {
        let mut file = File::open(path).map_err(|e| io_err(path, e))?;
        info!(bucket = %self.bucket, key, "uploading {}", path.display());
        self.client.put_object(&self.bucket, key, &mut file)
    }
}

impl ReleaseSource for ObjectStoreSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn publishable(&self) -> bool {
        self.publishable
    }

    fn get_matched_release(
        &self,
        requirement: &Requirement,
    ) -> Result<Option<RemoteRelease>, FetchError> {
        let key = self.template.expand(requirement)?;
        debug!(bucket = %self.bucket, key = %key, "probing object store");
        if !self.client.head_object(&self.bucket, &key)? {
            return Ok(None);
        }
        Ok(Some(RemoteRelease {
            id: requirement.release_id(),
            remote_path: key,
            source_id: self.id.clone(),
        }))
    }

    fn download_release(
        &self,
        dest_dir: &Path,
        remote: &RemoteRelease,
        concurrency: usize,
    ) -> Result<LocalRelease, FetchError> {
        let concurrency = if concurrency == 0 {
            DEFAULT_DOWNLOAD_CONCURRENCY
        } else {
            concurrency
        };
        let path = destination(dest_dir, file_name_for(&remote.remote_path))?;
        File::create(&path).map_err(|e| io_err(&path, e))?;

        info!(
            bucket = %self.bucket,
            key = %remote.remote_path,
            concurrency,
            "downloading {}",
            remote.id
        );
        let written = match self
            .client
            .get_object(&self.bucket, &remote.remote_path, &path, concurrency)
        {
            Ok(n) => n,
            Err(e) => {
                let _ = std::fs::remove_file(&path);
                return Err(FetchError::Transport {
                    context: "failed to download file".to_owned(),
                    message: e.to_string(),
                });
            }
        };
        debug!(bytes = written, path = %path.display(), "download complete");

        local_release(remote, path)
    }

    fn upload_release(
        &self,
        requirement: &Requirement,
        content: &mut dyn Read,
    ) -> Result<RemoteRelease, FetchError> {
        let key = self.template.expand(requirement)?;
        info!(bucket = %self.bucket, key = %key, "uploading {}", requirement.release_id());
        self.client.put_object(&self.bucket, &key, content)?;
        Ok(RemoteRelease {
            id: requirement.release_id(),
            remote_path: key,
            source_id: self.id.clone(),
        })
    }

    fn remote_path(&self, requirement: &Requirement) -> Result<String, FetchError> {
        Ok(self.template.expand(requirement)?)
    }
}
