//! Recording fakes shared by the unit tests.

use std::cell::RefCell;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use kiln_core::{KilnfileLock, LocalRelease, ReleaseLock, RemoteRelease, Requirement};
use kiln_fetcher::{FetchError, ReleaseSource};

use crate::error::LockError;
use crate::store::LockStore;

pub type Calls = Rc<RefCell<Vec<String>>>;

/// A source that always matches at `<id>/<name>-<version>.tgz` and reports
/// downloads with a fixed SHA1.
pub struct FakeSource {
    pub id: &'static str,
    pub sha1: &'static str,
    pub hit: bool,
    pub calls: Calls,
}

impl FakeSource {
    pub fn new(id: &'static str, sha1: &'static str, calls: &Calls) -> Self {
        Self {
            id,
            sha1,
            hit: true,
            calls: calls.clone(),
        }
    }
}

impl ReleaseSource for FakeSource {
    fn id(&self) -> &str {
        self.id
    }

    fn publishable(&self) -> bool {
        true
    }

    fn get_matched_release(
        &self,
        requirement: &Requirement,
    ) -> Result<Option<RemoteRelease>, FetchError> {
        self.calls
            .borrow_mut()
            .push(format!("match {}", requirement.release_id()));
        if !self.hit {
            return Ok(None);
        }
        Ok(Some(RemoteRelease {
            id: requirement.release_id(),
            remote_path: self.remote_path(requirement)?,
            source_id: self.id.to_owned(),
        }))
    }

    fn download_release(
        &self,
        dest_dir: &Path,
        remote: &RemoteRelease,
        _concurrency: usize,
    ) -> Result<LocalRelease, FetchError> {
        self.calls
            .borrow_mut()
            .push(format!("download {}", remote.id));
        Ok(LocalRelease {
            id: remote.id.clone(),
            local_path: dest_dir.join(format!("{}-{}.tgz", remote.id.name, remote.id.version)),
            sha1: self.sha1.to_owned(),
        })
    }

    fn upload_release(
        &self,
        _requirement: &Requirement,
        _content: &mut dyn Read,
    ) -> Result<RemoteRelease, FetchError> {
        unreachable!("reconciliation never uploads")
    }

    fn remote_path(&self, requirement: &Requirement) -> Result<String, FetchError> {
        if requirement.stemcell_os.is_empty() {
            return Ok(format!("{}-{}.tgz", requirement.name, requirement.version));
        }
        Ok(format!(
            "{}-{}-{}-{}.tgz",
            requirement.name, requirement.version, requirement.stemcell_os, requirement.stemcell_version
        ))
    }
}

/// Keeps every saved lock in memory.
#[derive(Default)]
pub struct RecordingStore {
    pub saved: RefCell<Vec<KilnfileLock>>,
}

impl LockStore for RecordingStore {
    fn save(&self, lock: &KilnfileLock) -> Result<(), LockError> {
        self.saved.borrow_mut().push(lock.clone());
        Ok(())
    }
}

pub fn entry(name: &str, version: &str, source: &str, path: &str, sha1: &str) -> ReleaseLock {
    ReleaseLock {
        name: name.into(),
        version: version.into(),
        remote_source: source.into(),
        remote_path: path.into(),
        sha1: sha1.into(),
    }
}
