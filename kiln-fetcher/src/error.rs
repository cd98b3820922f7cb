//! Error types for kiln-fetcher.

use std::path::PathBuf;

use thiserror::Error;

use kiln_core::ReleaseId;
use kiln_template::TemplateError;

/// All errors that can arise from release-source operations.
///
/// "Not found" is deliberately absent: a clean miss is `Ok(None)` from
/// `get_matched_release`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Backend or network fault. `context` names the bucket/key/org/URL.
    #[error("{context}: {message}")]
    Transport { context: String, message: String },

    /// A path template could not be expanded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Filesystem failure, annotated with the path being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote release points at a source that is not configured.
    #[error("release source {id:?} is not configured (known sources: {known})")]
    UnknownSource { id: String, known: String },

    /// The source kind cannot perform `operation`.
    #[error("release source {source_id:?} does not support {operation}")]
    Unsupported {
        source_id: String,
        operation: &'static str,
    },

    /// A Kilnfile release source entry is missing a required field.
    #[error("release source {source_id:?} is missing required field `{field}`")]
    MissingField {
        source_id: String,
        field: &'static str,
    },

    /// A release archive could not be read.
    #[error("error reading the release manifest from {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Removing a local artifact failed.
    #[error("failed to delete release {release}")]
    Delete {
        release: ReleaseId,
        #[source]
        source: std::io::Error,
    },

    /// Uploading would overwrite a release the source already has.
    #[error("release {release} already exists on {source_id} at {remote_path}")]
    AlreadyExists {
        release: ReleaseId,
        source_id: String,
        remote_path: String,
    },

    /// The Kilnfile has no object-store source at all.
    #[error("only release sources of type s3 are supported")]
    NoObjectStore,

    /// No object-store source uses the requested bucket.
    #[error("remote {bucket:?} does not match any configured bucket (acceptable buckets: {known})")]
    BucketNotConfigured { bucket: String, known: String },

    /// No configured source accepts uploads under the requested id.
    #[error("no release source eligible for upload with id {id:?} (publishable sources: {known})")]
    NotEligible { id: String, known: String },
}

/// Convenience constructor for [`FetchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`FetchError::Transport`].
pub(crate) fn transport_err(context: impl Into<String>, message: impl ToString) -> FetchError {
    FetchError::Transport {
        context: context.into(),
        message: message.to_string(),
    }
}
