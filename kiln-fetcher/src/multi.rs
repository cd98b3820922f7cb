//! Ordered fallback across configured release sources.

use std::path::Path;

use tracing::debug;

use kiln_core::{LocalRelease, RemoteRelease, Requirement};

use crate::error::FetchError;
use crate::source::ReleaseSource;

/// Release sources in preference order.
///
/// Matching walks the sources one at a time and stops at the first hit or
/// the first error; a clean miss is the only reason to move on.
pub struct MultiReleaseSource {
    sources: Vec<Box<dyn ReleaseSource>>,
}

impl MultiReleaseSource {
    /// Keep `sources` in order, dropping non-publishable ones when
    /// `allow_only_publishable` is set.
    pub fn new(sources: Vec<Box<dyn ReleaseSource>>, allow_only_publishable: bool) -> Self {
        let sources = sources
            .into_iter()
            .filter(|s| !allow_only_publishable || s.publishable())
            .collect();
        Self { sources }
    }

    pub fn sources(&self) -> &[Box<dyn ReleaseSource>] {
        &self.sources
    }

    fn known_ids(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.id())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The source whose id is `id`.
    pub fn find_by_id(&self, id: &str) -> Result<&dyn ReleaseSource, FetchError> {
        self.sources
            .iter()
            .find(|s| s.id() == id)
            .map(|s| &**s)
            .ok_or_else(|| FetchError::UnknownSource {
                id: id.to_owned(),
                known: self.known_ids(),
            })
    }

    /// First match across sources, in order.
    pub fn get_matched_release(
        &self,
        requirement: &Requirement,
    ) -> Result<Option<RemoteRelease>, FetchError> {
        for source in &self.sources {
            debug!(source = source.id(), release = %requirement.release_id(), "looking up release");
            if let Some(found) = source.get_matched_release(requirement)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Download through the source that produced `remote`.
    pub fn download_release(
        &self,
        dest_dir: &Path,
        remote: &RemoteRelease,
        concurrency: usize,
    ) -> Result<LocalRelease, FetchError> {
        self.find_by_id(&remote.source_id)?
            .download_release(dest_dir, remote, concurrency)
    }
}
