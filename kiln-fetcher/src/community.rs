//! Community index release source.
//!
//! Releases are published under `github.com/<org>/<repo>` where the repo is
//! the release name plus one of a few conventional suffixes. Matching probes
//! every organization × suffix candidate in a fixed order and stops at the
//! first hit.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use kiln_core::types::COMMUNITY_SOURCE_ID;
use kiln_core::{LocalRelease, RemoteRelease, Requirement};

use crate::error::{io_err, FetchError};
use crate::source::{destination, local_release, ReleaseSource};

/// Operations the community index must provide.
pub trait IndexClient {
    /// Whether `repo` (`org/name`) is known to the index. A definite absence
    /// is `Ok(false)`.
    fn release_exists(&self, repo: &str) -> Result<bool, FetchError>;

    /// Download URL for `repo` at `version`.
    fn download_url(&self, repo: &str, version: &str) -> String;

    /// Stream `url` into `out`, returning bytes written.
    fn fetch(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError>;
}

/// Organizations and repository suffixes probed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCatalog {
    pub organizations: Vec<String>,
    pub suffixes: Vec<String>,
}

const ORGANIZATIONS: &[&str] = &[
    "cloudfoundry",
    "pivotal-cf",
    "cloudfoundry-incubator",
    "pivotal-cf-experimental",
    "bosh-packages",
    "cppforlife",
    "vito",
    "flavorjones",
    "xoebus",
    "dpb587",
    "jamlo",
    "concourse",
    "cf-platform-eng",
    "starkandwayne",
    "cloudfoundry-community",
    "vmware",
    "DataDog",
    "Dynatrace",
    "SAP",
    "hybris",
    "minio",
    "rakutentech",
    "frodenas",
];

const SUFFIXES: &[&str] = &["-release", "-boshrelease", "-bosh-release", ""];

impl Default for IndexCatalog {
    fn default() -> Self {
        Self {
            organizations: ORGANIZATIONS.iter().map(|s| s.to_string()).collect(),
            suffixes: SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Release source backed by the public community index. Never publishable.
pub struct CommunityIndexSource {
    id: String,
    catalog: IndexCatalog,
    client: Box<dyn IndexClient>,
}

impl CommunityIndexSource {
    pub fn new(client: Box<dyn IndexClient>) -> Self {
        Self::with_catalog(COMMUNITY_SOURCE_ID, IndexCatalog::default(), client)
    }

    pub fn with_catalog(
        id: impl Into<String>,
        catalog: IndexCatalog,
        client: Box<dyn IndexClient>,
    ) -> Self {
        Self {
            id: id.into(),
            catalog,
            client,
        }
    }

    fn unsupported(&self, operation: &'static str) -> FetchError {
        FetchError::Unsupported {
            source_id: self.id.clone(),
            operation,
        }
    }
}

impl ReleaseSource for CommunityIndexSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn publishable(&self) -> bool {
        false
    }

    fn get_matched_release(
        &self,
        requirement: &Requirement,
    ) -> Result<Option<RemoteRelease>, FetchError> {
        for org in &self.catalog.organizations {
            for suffix in &self.catalog.suffixes {
                let repo = format!("{org}/{}{suffix}", requirement.name);
                debug!(repo = %repo, "probing community index");
                if self.client.release_exists(&repo)? {
                    return Ok(Some(RemoteRelease {
                        id: requirement.release_id(),
                        remote_path: self.client.download_url(&repo, &requirement.version),
                        source_id: self.id.clone(),
                    }));
                }
            }
        }
        Ok(None)
    }

    fn download_release(
        &self,
        dest_dir: &Path,
        remote: &RemoteRelease,
        _concurrency: usize,
    ) -> Result<LocalRelease, FetchError> {
        let file_name = format!("{}-{}.tgz", remote.id.name, remote.id.version);
        let path = destination(dest_dir, &file_name)?;
        let file = File::create(&path).map_err(|e| io_err(&path, e))?;
        let mut out = BufWriter::new(file);

        info!(url = %remote.remote_path, "downloading {}", remote.id);
        if let Err(e) = self.client.fetch(&remote.remote_path, &mut out) {
            drop(out);
            let _ = std::fs::remove_file(&path);
            return Err(e);
        }
        out.flush().map_err(|e| io_err(&path, e))?;
        drop(out);

        local_release(remote, path)
    }

    fn upload_release(
        &self,
        _requirement: &Requirement,
        _content: &mut dyn Read,
    ) -> Result<RemoteRelease, FetchError> {
        Err(self.unsupported("upload"))
    }

    fn remote_path(&self, _requirement: &Requirement) -> Result<String, FetchError> {
        Err(self.unsupported("remote path computation"))
    }
}
