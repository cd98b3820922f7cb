//! The local releases directory: discovery and pruning of release tarballs.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use kiln_core::{LocalRelease, ReleaseId};

use crate::error::{io_err, FetchError};
use crate::hash;

/// Identity declared inside a release tarball.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseManifest {
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
}

/// Versions like `1.0` are floats to YAML; keep their text.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version string, found {other:?}"
        ))),
    }
}

impl ReleaseManifest {
    pub fn release_id(&self) -> ReleaseId {
        ReleaseId::new(&self.name, &self.version)
    }
}

/// Extracts the [`ReleaseManifest`] of an archive on disk.
pub trait ManifestReader {
    fn read(&self, archive: &Path) -> Result<ReleaseManifest, FetchError>;
}

/// Reads `release.MF` out of a gzip-compressed tarball.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarballManifestReader;

fn is_manifest_entry(path: &Path) -> bool {
    path == Path::new("release.MF") || path == Path::new("./release.MF")
}

impl ManifestReader for TarballManifestReader {
    fn read(&self, archive: &Path) -> Result<ReleaseManifest, FetchError> {
        let manifest_err = |message: String| FetchError::Manifest {
            path: archive.to_path_buf(),
            message,
        };

        let file = File::open(archive).map_err(|e| io_err(archive, e))?;
        let mut tarball = tar::Archive::new(GzDecoder::new(file));
        let entries = tarball.entries().map_err(|e| manifest_err(e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| manifest_err(e.to_string()))?;
            let wanted = is_manifest_entry(&entry.path().map_err(|e| manifest_err(e.to_string()))?);
            if !wanted {
                continue;
            }
            let mut contents = String::new();
            entry
                .read_to_string(&mut contents)
                .map_err(|e| manifest_err(e.to_string()))?;
            return serde_yaml::from_str(&contents).map_err(|e| manifest_err(e.to_string()));
        }
        Err(manifest_err("release.MF not found in archive".to_owned()))
    }
}

/// Asks the operator before destructive actions.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Lists and prunes the release tarballs in a directory.
pub struct LocalReleaseDirectory {
    reader: Box<dyn ManifestReader>,
    confirmer: Box<dyn Confirmer>,
}

impl LocalReleaseDirectory {
    pub fn new(reader: Box<dyn ManifestReader>, confirmer: Box<dyn Confirmer>) -> Self {
        Self { reader, confirmer }
    }

    /// Every `*.tgz` in `dir` with its manifest identity and SHA1, sorted by
    /// file name. An empty directory yields an empty list.
    pub fn get_local_releases(&self, dir: &Path) -> Result<Vec<LocalRelease>, FetchError> {
        let mut archives: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "tgz") {
                archives.push(path);
            }
        }
        archives.sort();

        let mut releases = Vec::with_capacity(archives.len());
        for path in archives {
            let manifest = self.reader.read(&path)?;
            let sha1 = hash::file_sha1(&path)?;
            debug!(path = %path.display(), release = %manifest.release_id(), "found local release");
            releases.push(LocalRelease {
                id: manifest.release_id(),
                local_path: path,
                sha1,
            });
        }
        Ok(releases)
    }

    /// Remove the files of `extras`. Stops at the first failure, naming that
    /// release. Declining the confirmation prompt deletes nothing.
    pub fn delete_extra_releases(
        &self,
        extras: &[LocalRelease],
        skip_confirmation: bool,
    ) -> Result<Vec<ReleaseId>, FetchError> {
        if extras.is_empty() {
            return Ok(Vec::new());
        }
        if !skip_confirmation {
            let listing: Vec<String> = extras.iter().map(|r| format!("  - {}", r.id)).collect();
            let prompt = format!(
                "The following releases will be deleted:\n{}\nContinue?",
                listing.join("\n")
            );
            if !self.confirmer.confirm(&prompt) {
                info!("deletion declined");
                return Ok(Vec::new());
            }
        }

        let mut deleted = Vec::with_capacity(extras.len());
        for release in extras {
            fs::remove_file(&release.local_path).map_err(|source| FetchError::Delete {
                release: release.id.clone(),
                source,
            })?;
            info!(release = %release.id, "deleted {}", release.local_path.display());
            deleted.push(release.id.clone());
        }
        Ok(deleted)
    }
}
