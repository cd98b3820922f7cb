//! Publishing a locally built release tarball to a release source.

use std::fs::File;
use std::path::Path;

use tracing::info;

use kiln_core::{RemoteRelease, Requirement};

use crate::error::{io_err, FetchError};
use crate::local_directory::ManifestReader;
use crate::multi::MultiReleaseSource;
use crate::source::ReleaseSource;

/// The publishable source named `source_id`.
pub fn upload_target<'a>(
    sources: &'a MultiReleaseSource,
    source_id: &str,
) -> Result<&'a dyn ReleaseSource, FetchError> {
    let eligible: Vec<&dyn ReleaseSource> = sources
        .sources()
        .iter()
        .map(|s| &**s)
        .filter(|s| s.publishable())
        .collect();
    eligible
        .iter()
        .copied()
        .find(|s| s.id() == source_id)
        .ok_or_else(|| FetchError::NotEligible {
            id: source_id.to_owned(),
            known: eligible.iter().map(|s| s.id()).collect::<Vec<_>>().join(", "),
        })
}

/// Upload the tarball at `path` unless `target` already has that release.
///
/// The release identity comes from the tarball's manifest; the probe uses no
/// stemcell, matching how uploaded source releases are keyed.
pub fn upload_local_release(
    target: &dyn ReleaseSource,
    reader: &dyn ManifestReader,
    path: &Path,
) -> Result<RemoteRelease, FetchError> {
    let manifest = reader.read(path)?;
    let requirement = Requirement::new(&manifest.name, &manifest.version);

    if let Some(existing) = target.get_matched_release(&requirement)? {
        return Err(FetchError::AlreadyExists {
            release: existing.id,
            source_id: target.id().to_owned(),
            remote_path: existing.remote_path,
        });
    }

    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let remote = target.upload_release(&requirement, &mut file)?;
    info!(
        release = %remote.id,
        source = target.id(),
        remote_path = %remote.remote_path,
        "uploaded release"
    );
    Ok(remote)
}
