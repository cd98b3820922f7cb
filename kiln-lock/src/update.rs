//! Bump one named release in the lock.

use std::fmt;
use std::path::PathBuf;

use tracing::info;

use kiln_core::{KilnfileLock, ReleaseId, ReleaseLock, Requirement};
use kiln_fetcher::MultiReleaseSource;

use crate::error::LockError;
use crate::store::LockStore;

/// What to update and where to put the downloaded artifact.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub name: String,
    pub version: String,
    pub releases_dir: PathBuf,
    /// Multi-part download hint; `0` picks the backend default.
    pub concurrency: usize,
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The resolved release matched the lock entry exactly; nothing saved.
    Unchanged { release: ReleaseId },
    /// The entry was replaced and the lock saved.
    Committed {
        previous: ReleaseLock,
        updated: ReleaseLock,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::Unchanged { release } => {
                write!(f, "No changes made to {}", release.name)
            }
            UpdateOutcome::Committed { previous, updated } => write!(
                f,
                "Updated {} from {} to {}",
                updated.name, previous.version, updated.version
            ),
        }
    }
}

/// The four fields that decide whether an update is a no-op.
fn same_pin(a: &ReleaseLock, b: &ReleaseLock) -> bool {
    a.version == b.version
        && a.sha1 == b.sha1
        && a.remote_source == b.remote_source
        && a.remote_path == b.remote_path
}

/// Resolve, download, and pin `request.name` at `request.version`.
///
/// The lock passed in is never modified; the returned lock is what was
/// saved (or an unchanged copy). `store` is called at most once and only
/// when the entry actually changes.
pub fn update_release(
    lock: &KilnfileLock,
    sources: &MultiReleaseSource,
    request: &UpdateRequest,
    store: &dyn LockStore,
) -> Result<(KilnfileLock, UpdateOutcome), LockError> {
    let (index, current) = lock
        .find_release(&request.name)
        .ok_or_else(|| LockError::unknown_release(&request.name))?;

    let requirement =
        Requirement::new(&request.name, &request.version).with_stemcell(&lock.stemcell);
    let remote = sources
        .get_matched_release(&requirement)?
        .ok_or_else(|| LockError::NotFound {
            release: requirement.release_id(),
        })?;

    let local = sources.download_release(&request.releases_dir, &remote, request.concurrency)?;

    let candidate = ReleaseLock {
        name: current.name.clone(),
        version: request.version.clone(),
        remote_source: remote.source_id.clone(),
        remote_path: remote.remote_path.clone(),
        sha1: local.sha1,
    };

    if same_pin(current, &candidate) {
        info!(release = %candidate.id(), "lock already up to date");
        return Ok((
            lock.clone(),
            UpdateOutcome::Unchanged {
                release: candidate.id(),
            },
        ));
    }

    let previous = current.clone();
    let mut updated = lock.clone();
    updated.releases[index] = candidate.clone();
    store.save(&updated)?;
    info!(
        release = %candidate.id(),
        source = %candidate.remote_source,
        "updated lock entry"
    );

    Ok((
        updated,
        UpdateOutcome::Committed {
            previous,
            updated: candidate,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Stemcell;
    use kiln_fetcher::ReleaseSource;

    use crate::testing::{entry, Calls, FakeSource, RecordingStore};

    fn lock() -> KilnfileLock {
        KilnfileLock {
            releases: vec![
                entry("bpm", "1.1", "compiled", "bpm-1.1-ubuntu-xenial-621.55.tgz", "b1"),
                entry("uaa", "1.0", "compiled", "uaa-1.0-ubuntu-xenial-621.55.tgz", "aaa"),
                entry("zookeeper", "3.4", "compiled", "zookeeper-3.4-ubuntu-xenial-621.55.tgz", "z1"),
            ],
            stemcell: Stemcell {
                os: "ubuntu-xenial".into(),
                version: "621.55".into(),
            },
        }
    }

    fn request(name: &str, version: &str) -> UpdateRequest {
        UpdateRequest {
            name: name.into(),
            version: version.into(),
            releases_dir: PathBuf::from("/releases"),
            concurrency: 0,
        }
    }

    fn sources(sha1: &'static str, calls: &Calls) -> MultiReleaseSource {
        let source: Box<dyn ReleaseSource> = Box::new(FakeSource::new("compiled", sha1, calls));
        MultiReleaseSource::new(vec![source], false)
    }

    #[test]
    fn identical_result_skips_persistence() {
        let calls = Calls::default();
        let store = RecordingStore::default();

        let (after, outcome) =
            update_release(&lock(), &sources("aaa", &calls), &request("uaa", "1.0"), &store)
                .unwrap();

        assert!(store.saved.borrow().is_empty());
        assert_eq!(after, lock());
        assert!(outcome.to_string().contains("No changes made"), "got: {outcome}");
    }

    #[test]
    fn changed_sha_rewrites_only_that_entry() {
        let calls = Calls::default();
        let store = RecordingStore::default();

        let (after, outcome) =
            update_release(&lock(), &sources("bbb", &calls), &request("uaa", "1.0"), &store)
                .unwrap();

        let saved = store.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0], after);

        let before = lock();
        assert_eq!(after.releases.len(), 3);
        assert_eq!(after.releases[0], before.releases[0]);
        assert_eq!(after.releases[2], before.releases[2]);
        assert_eq!(after.releases[1].name, "uaa");
        assert_eq!(after.releases[1].sha1, "bbb");
        assert_eq!(after.stemcell, before.stemcell);
        assert_eq!(outcome.to_string(), "Updated uaa from 1.0 to 1.0");
    }

    #[test]
    fn new_version_uses_lock_stemcell() {
        let calls = Calls::default();
        let store = RecordingStore::default();

        let (after, outcome) =
            update_release(&lock(), &sources("ccc", &calls), &request("uaa", "2.0"), &store)
                .unwrap();

        assert_eq!(
            after.releases[1],
            entry("uaa", "2.0", "compiled", "uaa-2.0-ubuntu-xenial-621.55.tgz", "ccc")
        );
        assert_eq!(outcome.to_string(), "Updated uaa from 1.0 to 2.0");
        assert_eq!(*calls.borrow(), vec!["match uaa@2.0", "download uaa@2.0"]);
    }

    #[test]
    fn unknown_name_touches_nothing() {
        let calls = Calls::default();
        let store = RecordingStore::default();

        let err = update_release(&lock(), &sources("aaa", &calls), &request("cf", "1"), &store)
            .unwrap_err();

        assert!(err.to_string().contains("no release named"), "got: {err}");
        assert!(calls.borrow().is_empty());
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn release_suffix_gets_a_hint() {
        let calls = Calls::default();
        let store = RecordingStore::default();
        let err = update_release(
            &lock(),
            &sources("aaa", &calls),
            &request("uaa-release", "1"),
            &store,
        )
        .unwrap_err();
        assert!(err.to_string().contains("try removing the -release suffix"));
    }

    #[test]
    fn unmatched_release_fails_without_download() {
        let calls = Calls::default();
        let store = RecordingStore::default();
        let mut source = FakeSource::new("compiled", "aaa", &calls);
        source.hit = false;
        let boxed: Box<dyn ReleaseSource> = Box::new(source);
        let multi = MultiReleaseSource::new(vec![boxed], false);

        let err = update_release(&lock(), &multi, &request("uaa", "9.9"), &store).unwrap_err();

        assert!(matches!(err, LockError::NotFound { .. }));
        assert!(err.to_string().contains("uaa@9.9"));
        assert_eq!(*calls.borrow(), vec!["match uaa@9.9"]);
        assert!(store.saved.borrow().is_empty());
    }
}
