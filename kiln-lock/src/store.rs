//! Where a reconciled lock is persisted.

use std::path::{Path, PathBuf};

use kiln_core::lockfile::{lock_path_for, save_lock_at};
use kiln_core::KilnfileLock;

use crate::error::LockError;

/// Persists a lock. Called at most once per reconciliation.
pub trait LockStore {
    fn save(&self, lock: &KilnfileLock) -> Result<(), LockError>;
}

/// Atomic save to a YAML file on disk.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The lock that sits next to `kilnfile`.
    pub fn for_kilnfile(kilnfile: &Path) -> Self {
        Self::new(lock_path_for(kilnfile))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LockStore for FileLockStore {
    fn save(&self, lock: &KilnfileLock) -> Result<(), LockError> {
        save_lock_at(&self.path, lock)?;
        Ok(())
    }
}
