//! Domain types for releases, Kilnfiles, and Kilnfile locks.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Persisted types are serializable/deserializable via serde + serde_yaml and
//! keep the Kilnfile.lock field names fixed.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source id used by a community-index source that does not set `id`.
pub const COMMUNITY_SOURCE_ID: &str = "bosh.io";

/// Source id used by a local-directory source that does not set `id`.
pub const LOCAL_SOURCE_ID: &str = "local";

// ---------------------------------------------------------------------------
// Release identities
// ---------------------------------------------------------------------------

/// Immutable identity of a release: name plus exact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseId {
    pub name: String,
    pub version: String,
}

impl ReleaseId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A query for a wanted release version, qualified by the target stemcell.
///
/// Stemcell fields are empty when the caller has no stemcell in scope
/// (e.g. uploading a release that is not compiled).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    pub stemcell_os: String,
    pub stemcell_version: String,
}

impl Requirement {
    /// Requirement without stemcell qualification.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Qualify this requirement with `stemcell`.
    pub fn with_stemcell(mut self, stemcell: &Stemcell) -> Self {
        self.stemcell_os = stemcell.os.clone();
        self.stemcell_version = stemcell.version.clone();
        self
    }

    pub fn release_id(&self) -> ReleaseId {
        ReleaseId::new(&self.name, &self.version)
    }
}

/// A release located on a backend.
///
/// `source_id` names the source that produced the match so later downloads are
/// routed back to the same backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRelease {
    pub id: ReleaseId,
    pub remote_path: String,
    pub source_id: String,
}

/// A release materialized on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRelease {
    pub id: ReleaseId,
    pub local_path: PathBuf,
    /// Lowercase hex SHA1 of the file at `local_path`.
    pub sha1: String,
}

// ---------------------------------------------------------------------------
// Kilnfile.lock
// ---------------------------------------------------------------------------

/// Stemcell OS and version a product is compiled against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stemcell {
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub version: String,
}

/// One fully pinned release in Kilnfile.lock.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseLock {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub remote_source: String,
    #[serde(default)]
    pub remote_path: String,
    #[serde(default)]
    pub sha1: String,
}

impl ReleaseLock {
    pub fn id(&self) -> ReleaseId {
        ReleaseId::new(&self.name, &self.version)
    }
}

/// Root of Kilnfile.lock.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KilnfileLock {
    #[serde(default)]
    pub releases: Vec<ReleaseLock>,
    #[serde(default, rename = "stemcell_criteria", alias = "stemcell")]
    pub stemcell: Stemcell,
}

impl KilnfileLock {
    /// Index and entry of the release named `name`, if locked.
    pub fn find_release(&self, name: &str) -> Option<(usize, &ReleaseLock)> {
        self.releases
            .iter()
            .enumerate()
            .find(|(_, r)| r.name == name)
    }

    /// Whether the lock pins exactly `id`.
    pub fn contains(&self, id: &ReleaseId) -> bool {
        self.releases
            .iter()
            .any(|r| r.name == id.name && r.version == id.version)
    }
}

// ---------------------------------------------------------------------------
// Kilnfile
// ---------------------------------------------------------------------------

/// Backend kind of a configured release source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Private object storage with a templated key layout.
    #[serde(rename = "s3", alias = "object-store")]
    ObjectStore,
    /// Public community index probed by naming convention.
    #[serde(rename = "bosh.io", alias = "community-index")]
    CommunityIndex,
    /// A directory on local disk.
    #[serde(rename = "local")]
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::ObjectStore => write!(f, "s3"),
            SourceKind::CommunityIndex => write!(f, "bosh.io"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

/// One entry of `release_sources` in the Kilnfile.
///
/// Only the fields relevant to `kind` are read; validation of required fields
/// happens when the source is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub publishable: bool,
}

impl ReleaseSourceConfig {
    /// A config of `kind` with every optional field unset.
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            id: None,
            bucket: None,
            path_template: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            directory: None,
            publishable: false,
        }
    }

    /// Identifier recorded as `remote_source` in the lock.
    ///
    /// Explicit `id` wins; otherwise object stores use their bucket and the
    /// other kinds use a fixed name.
    pub fn source_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        match self.kind {
            SourceKind::ObjectStore => self.bucket.clone().unwrap_or_default(),
            SourceKind::CommunityIndex => COMMUNITY_SOURCE_ID.to_owned(),
            SourceKind::Local => LOCAL_SOURCE_ID.to_owned(),
        }
    }
}

/// A release tracked by the Kilnfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KilnfileRelease {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Root of the Kilnfile: desired-state configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Kilnfile {
    /// Ordered by preference; earlier sources win.
    #[serde(default)]
    pub release_sources: Vec<ReleaseSourceConfig>,
    #[serde(default)]
    pub releases: Vec<KilnfileRelease>,
    #[serde(default, rename = "stemcell_criteria", alias = "stemcell")]
    pub stemcell: Stemcell,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_id_display() {
        assert_eq!(ReleaseId::new("uaa", "1.2.3").to_string(), "uaa@1.2.3");
    }

    #[test]
    fn requirement_takes_stemcell() {
        let stemcell = Stemcell {
            os: "ubuntu-xenial".into(),
            version: "621.55".into(),
        };
        let req = Requirement::new("bpm", "1.0").with_stemcell(&stemcell);
        assert_eq!(req.stemcell_os, "ubuntu-xenial");
        assert_eq!(req.stemcell_version, "621.55");
        assert_eq!(req.release_id(), ReleaseId::new("bpm", "1.0"));
    }

    #[test]
    fn source_id_defaults_by_kind() {
        let mut s3 = ReleaseSourceConfig::new(SourceKind::ObjectStore);
        s3.bucket = Some("built-bucket".into());
        assert_eq!(s3.source_id(), "built-bucket");

        s3.id = Some("compiled".into());
        assert_eq!(s3.source_id(), "compiled");

        let index = ReleaseSourceConfig::new(SourceKind::CommunityIndex);
        assert_eq!(index.source_id(), COMMUNITY_SOURCE_ID);

        let local = ReleaseSourceConfig::new(SourceKind::Local);
        assert_eq!(local.source_id(), LOCAL_SOURCE_ID);
    }

    #[test]
    fn source_kind_accepts_descriptive_aliases() {
        let yaml = "type: object-store\nbucket: b\n";
        let cfg: ReleaseSourceConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(cfg.kind, SourceKind::ObjectStore);

        let yaml = "type: community-index\n";
        let cfg: ReleaseSourceConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(cfg.kind, SourceKind::CommunityIndex);
    }

    #[test]
    fn lock_reads_legacy_stemcell_key() {
        let yaml = "releases: []\nstemcell:\n  os: plan9\n  version: \"42\"\n";
        let lock: KilnfileLock = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(lock.stemcell.os, "plan9");
        assert_eq!(lock.stemcell.version, "42");
    }

    #[test]
    fn find_release_returns_index() {
        let lock = KilnfileLock {
            releases: vec![
                ReleaseLock {
                    name: "a".into(),
                    version: "1".into(),
                    ..ReleaseLock::default()
                },
                ReleaseLock {
                    name: "b".into(),
                    version: "2".into(),
                    ..ReleaseLock::default()
                },
            ],
            stemcell: Stemcell::default(),
        };
        let (idx, entry) = lock.find_release("b").expect("b is locked");
        assert_eq!(idx, 1);
        assert_eq!(entry.version, "2");
        assert!(lock.find_release("c").is_none());
        assert!(lock.contains(&ReleaseId::new("a", "1")));
        assert!(!lock.contains(&ReleaseId::new("a", "2")));
    }
}
