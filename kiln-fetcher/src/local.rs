//! Release source backed by a directory on local disk.
//!
//! Not publishable unless the Kilnfile says so.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use kiln_core::types::LOCAL_SOURCE_ID;
use kiln_core::{LocalRelease, RemoteRelease, Requirement};
use kiln_template::{PathTemplate, DEFAULT_LOCAL_TEMPLATE};

use crate::error::{io_err, FetchError};
use crate::source::{destination, file_name_for, local_release, ReleaseSource};

/// Serves releases from `root`, laid out by a path template relative to it.
#[derive(Debug)]
pub struct LocalDirectorySource {
    id: String,
    root: PathBuf,
    template: PathTemplate,
    publishable: bool,
}

impl LocalDirectorySource {
    /// Source at `root` using [`DEFAULT_LOCAL_TEMPLATE`].
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FetchError> {
        Ok(Self::with_template(
            LOCAL_SOURCE_ID,
            root,
            PathTemplate::parse(DEFAULT_LOCAL_TEMPLATE)?,
        ))
    }

    pub fn with_template(id: impl Into<String>, root: impl Into<PathBuf>, template: PathTemplate) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
            template,
            publishable: false,
        }
    }

    /// Mark the directory as holding releases fit for publishing.
    pub fn with_publishable(mut self, publishable: bool) -> Self {
        self.publishable = publishable;
        self
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl ReleaseSource for LocalDirectorySource {
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
        let path = self.root.join(&key);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Some(RemoteRelease {
                id: requirement.release_id(),
                remote_path: key,
                source_id: self.id.clone(),
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(path, e)),
        }
    }

    fn download_release(
        &self,
        dest_dir: &Path,
        remote: &RemoteRelease,
        _concurrency: usize,
    ) -> Result<LocalRelease, FetchError> {
        let from = self.root.join(&remote.remote_path);
        let to = destination(dest_dir, file_name_for(&remote.remote_path))?;
        if same_file(&from, &to) {
            debug!(path = %to.display(), "release already in place");
        } else {
            fs::copy(&from, &to).map_err(|e| io_err(&from, e))?;
        }
        local_release(remote, to)
    }

    fn upload_release(
        &self,
        requirement: &Requirement,
        content: &mut dyn Read,
    ) -> Result<RemoteRelease, FetchError> {
        let key = self.template.expand(requirement)?;
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut file = File::create(&path).map_err(|e| io_err(&path, e))?;
        io::copy(content, &mut file).map_err(|e| io_err(&path, e))?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::hash::bytes_sha1;

    #[test]
    fn matches_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("uaa-1.0.tgz"), b"x").unwrap();
        let src = LocalDirectorySource::new(tmp.path()).unwrap();

        let found = src.get_matched_release(&Requirement::new("uaa", "1.0")).unwrap();
        assert_eq!(found.unwrap().remote_path, "uaa-1.0.tgz");
        assert!(src
            .get_matched_release(&Requirement::new("uaa", "2.0"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn download_copies_and_hashes() {
        let store = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(store.path().join("uaa-1.0.tgz"), b"archive").unwrap();
        let src = LocalDirectorySource::new(store.path()).unwrap();

        let remote = src
            .get_matched_release(&Requirement::new("uaa", "1.0"))
            .unwrap()
            .unwrap();
        let local = src.download_release(dest.path(), &remote, 0).unwrap();
        assert_eq!(local.local_path, dest.path().join("uaa-1.0.tgz"));
        assert_eq!(local.sha1, bytes_sha1(b"archive"));
    }

    #[test]
    fn download_into_own_root_leaves_file_alone() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("uaa-1.0.tgz"), b"archive").unwrap();
        let src = LocalDirectorySource::new(tmp.path()).unwrap();
        let remote = src
            .get_matched_release(&Requirement::new("uaa", "1.0"))
            .unwrap()
            .unwrap();
        let local = src.download_release(tmp.path(), &remote, 0).unwrap();
        assert_eq!(fs::read(local.local_path).unwrap(), b"archive");
    }

    #[test]
    fn upload_creates_nested_layout() {
        let tmp = TempDir::new().unwrap();
        let template = PathTemplate::parse("{{ name }}/{{ name }}-{{ version }}.tgz").unwrap();
        let src = LocalDirectorySource::with_template("stash", tmp.path(), template);

        let remote = src
            .upload_release(&Requirement::new("bpm", "1.1"), &mut &b"bpm"[..])
            .unwrap();
        assert_eq!(remote.remote_path, "bpm/bpm-1.1.tgz");
        assert_eq!(remote.source_id, "stash");
        assert_eq!(fs::read(tmp.path().join("bpm/bpm-1.1.tgz")).unwrap(), b"bpm");
    }

    #[test]
    fn unknown_template_field_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let template = PathTemplate::parse("{{ name }}/{{ flavour }}.tgz").unwrap();
        let src = LocalDirectorySource::with_template("stash", tmp.path(), template);
        let bpm = Requirement::new("bpm", "1.1");

        let errors = [
            src.get_matched_release(&bpm).map(|_| ()).unwrap_err(),
            src.upload_release(&bpm, &mut &b"bpm"[..]).map(|_| ()).unwrap_err(),
            src.remote_path(&bpm).map(|_| ()).unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, FetchError::Template(_)), "got: {err:?}");
            assert!(err.to_string().contains("flavour"), "got: {err}");
        }
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
