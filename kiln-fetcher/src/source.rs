//! The release-source capability shared by every backend.

use std::io::Read;
use std::path::{Path, PathBuf};

use kiln_core::{LocalRelease, RemoteRelease, Requirement};

use crate::error::{io_err, FetchError};
use crate::hash;

/// Download concurrency used when the caller passes `0`.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 5;

/// A backend capable of locating, fetching, and/or storing release archives.
///
/// Implementations: [`ObjectStoreSource`](crate::ObjectStoreSource),
/// [`CommunityIndexSource`](crate::CommunityIndexSource),
/// [`LocalDirectorySource`](crate::LocalDirectorySource).
pub trait ReleaseSource {
    /// Identifier recorded as `remote_source` in the lock.
    fn id(&self) -> &str;

    /// Whether releases from this source may ship in a published product.
    fn publishable(&self) -> bool;

    /// Locate `requirement`. A clean miss is `Ok(None)`; backend faults are
    /// errors and must not be treated as a miss.
    fn get_matched_release(
        &self,
        requirement: &Requirement,
    ) -> Result<Option<RemoteRelease>, FetchError>;

    /// Fetch `remote` into `dest_dir` and hash it.
    ///
    /// `concurrency` is a multi-part hint for this one artifact; `0` selects
    /// the backend default.
    fn download_release(
        &self,
        dest_dir: &Path,
        remote: &RemoteRelease,
        concurrency: usize,
    ) -> Result<LocalRelease, FetchError>;

    /// Store `content` at the key derived from `requirement`.
    fn upload_release(
        &self,
        requirement: &Requirement,
        content: &mut dyn Read,
    ) -> Result<RemoteRelease, FetchError>;

    /// The key `requirement` maps to on this source. Pure; no I/O.
    fn remote_path(&self, requirement: &Requirement) -> Result<String, FetchError>;
}

/// Local file name for a remote path: its last `/`-separated segment.
pub(crate) fn file_name_for(remote_path: &str) -> &str {
    remote_path
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(remote_path)
}

/// Destination path inside `dest_dir`, failing early when the directory is
/// not usable so the error names it.
pub(crate) fn destination(dest_dir: &Path, file_name: &str) -> Result<PathBuf, FetchError> {
    let meta = std::fs::metadata(dest_dir).map_err(|e| io_err(dest_dir, e))?;
    if !meta.is_dir() {
        return Err(io_err(
            dest_dir,
            std::io::Error::other("destination is not a directory"),
        ));
    }
    Ok(dest_dir.join(file_name))
}

/// Build the [`LocalRelease`] for a fully written download.
pub(crate) fn local_release(remote: &RemoteRelease, path: PathBuf) -> Result<LocalRelease, FetchError> {
    let sha1 = hash::file_sha1(&path)?;
    Ok(LocalRelease {
        id: remote.id.clone(),
        local_path: path,
        sha1,
    })
}
