//! Re-point the lock at a rebuilt local releases directory.

use tracing::{info, warn};

use kiln_core::{KilnfileLock, LocalRelease, ReleaseId, Requirement};
use kiln_fetcher::ReleaseSource;

use crate::error::LockError;
use crate::store::LockStore;

/// Which lock entries were rewritten and which had no local artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub updated: Vec<ReleaseId>,
    pub untouched: Vec<ReleaseId>,
}

/// Rewrite `remote_source`, `remote_path` and `sha1` of every lock entry
/// that has a local artifact, as if the artifacts lived on `target`.
///
/// Every local artifact must already be pinned by name and version. The
/// lock is saved unconditionally once all paths are computed.
pub fn sync_with_local(
    lock: &KilnfileLock,
    local: &[LocalRelease],
    target: &dyn ReleaseSource,
    store: &dyn LockStore,
) -> Result<(KilnfileLock, SyncSummary), LockError> {
    if let Some(stray) = local.iter().find(|r| !lock.contains(&r.id)) {
        return Err(LockError::NotInLock {
            release: stray.id.clone(),
        });
    }

    let mut computed = Vec::with_capacity(local.len());
    for release in local {
        let requirement = Requirement::new(&release.id.name, &release.id.version)
            .with_stemcell(&lock.stemcell);
        let remote_path = target
            .remote_path(&requirement)
            .map_err(|source| LockError::RemotePath {
                release: release.id.clone(),
                source,
            })?;
        computed.push((release, remote_path));
    }

    let mut updated = lock.clone();
    let mut summary = SyncSummary::default();
    for entry in &mut updated.releases {
        let found = computed
            .iter()
            .find(|(r, _)| r.id.name == entry.name && r.id.version == entry.version);
        match found {
            Some((release, remote_path)) => {
                entry.remote_source = target.id().to_owned();
                entry.remote_path = remote_path.clone();
                entry.sha1 = release.sha1.clone();
                summary.updated.push(entry.id());
            }
            None => {
                warn!(release = %entry.id(), "no local artifact; entry left as-is");
                summary.untouched.push(entry.id());
            }
        }
    }

    store.save(&updated)?;
    info!(
        updated = summary.updated.len(),
        untouched = summary.untouched.len(),
        source = target.id(),
        "lock synced with local releases"
    );
    Ok((updated, summary))
}
