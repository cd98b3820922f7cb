//! Error types for kiln-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading, saving, or checking Kilnfiles.
#[derive(Debug, Error)]
pub enum KilnfileError {
    /// Underlying I/O failure, annotated with the path being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The Kilnfile or Kilnfile.lock did not exist at the expected path.
    #[error("file not found at {path}")]
    NotFound { path: PathBuf },

    /// A Kilnfile variable could not be loaded or resolved.
    #[error("{message}")]
    Variable { message: String },

    /// The lock does not agree with the Kilnfile (or with itself).
    #[error("Kilnfile.lock is inconsistent: {reason}")]
    Inconsistent { reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> KilnfileError {
    KilnfileError::Io {
        path: path.into(),
        source,
    }
}
