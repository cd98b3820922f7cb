//! Kilnfile and Kilnfile.lock persistence.
//!
//! # Storage layout
//!
//! ```text
//! <product>/
//!   Kilnfile        (desired state, read-only for kiln)
//!   Kilnfile.lock   (pinned state, rewritten atomically)
//! ```
//!
//! The lock always lives next to its Kilnfile as `<kilnfile>.lock`.
//! Saves go through a `.tmp` sibling and a rename so a failed write never
//! leaves a half-written lock behind.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{io_err, KilnfileError};
use crate::types::{Kilnfile, KilnfileLock};
use crate::variables::Variables;

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<kilnfile>.lock` — pure, no I/O.
pub fn lock_path_for(kilnfile: &Path) -> PathBuf {
    let mut name: OsString = kilnfile
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("Kilnfile"));
    name.push(".lock");
    kilnfile.with_file_name(name)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the Kilnfile at `path`.
///
/// Returns `KilnfileError::NotFound` if absent,
/// `KilnfileError::Parse` (with path + line context) if malformed YAML.
pub fn load_kilnfile_at(path: &Path) -> Result<Kilnfile, KilnfileError> {
    load_kilnfile_with(path, &Variables::default())
}

/// Load the Kilnfile at `path`, resolving `$( variable "..." )` from `vars`
/// before parsing.
pub fn load_kilnfile_with(path: &Path, vars: &Variables) -> Result<Kilnfile, KilnfileError> {
    let contents = read(path)?;
    let contents = vars.interpolate(&contents)?;
    parse(path, &contents)
}

/// Load the Kilnfile.lock at `path`.
pub fn load_lock_at(path: &Path) -> Result<KilnfileLock, KilnfileError> {
    parse(path, &read(path)?)
}

/// Load the Kilnfile at `kilnfile` and its sibling lock.
pub fn load_kilnfiles(kilnfile: &Path) -> Result<(Kilnfile, KilnfileLock), KilnfileError> {
    load_kilnfiles_with(kilnfile, &Variables::default())
}

/// [`load_kilnfiles`] with variables for the Kilnfile. The lock is never
/// interpolated.
pub fn load_kilnfiles_with(
    kilnfile: &Path,
    vars: &Variables,
) -> Result<(Kilnfile, KilnfileLock), KilnfileError> {
    let desired = load_kilnfile_with(kilnfile, vars)?;
    let lock = load_lock_at(&lock_path_for(kilnfile))?;
    Ok((desired, lock))
}

fn read(path: &Path) -> Result<String, KilnfileError> {
    if !path.exists() {
        return Err(KilnfileError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

fn parse<T: DeserializeOwned>(path: &Path, contents: &str) -> Result<T, KilnfileError> {
    serde_yaml::from_str(contents).map_err(|e| KilnfileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `lock` to `path`.
///
/// Write flow: serialize → `<name>.tmp` sibling → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_lock_at(path: &Path, lock: &KilnfileLock) -> Result<(), KilnfileError> {
    let yaml = serde_yaml::to_string(lock)?;

    let mut tmp_name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("Kilnfile.lock"));
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Consistency
// ---------------------------------------------------------------------------

/// Check that `lock` pins each release at most once and, when the Kilnfile
/// tracks releases explicitly, exactly the tracked set.
pub fn check_consistency(kilnfile: &Kilnfile, lock: &KilnfileLock) -> Result<(), KilnfileError> {
    let mut locked = BTreeSet::new();
    for release in &lock.releases {
        if !locked.insert(release.name.as_str()) {
            return Err(KilnfileError::Inconsistent {
                reason: format!("release {:?} is locked more than once", release.name),
            });
        }
    }

    if kilnfile.releases.is_empty() {
        return Ok(());
    }

    let tracked: BTreeSet<&str> = kilnfile.releases.iter().map(|r| r.name.as_str()).collect();

    let missing: Vec<&str> = tracked.difference(&locked).copied().collect();
    if !missing.is_empty() {
        return Err(KilnfileError::Inconsistent {
            reason: format!("releases missing from lock: {}", missing.join(", ")),
        });
    }

    let untracked: Vec<&str> = locked.difference(&tracked).copied().collect();
    if !untracked.is_empty() {
        return Err(KilnfileError::Inconsistent {
            reason: format!("locked releases not in Kilnfile: {}", untracked.join(", ")),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
