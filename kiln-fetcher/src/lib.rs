//! # kiln-fetcher
//!
//! Release sources and the local releases directory.
//!
//! Every backend implements [`ReleaseSource`]. Build them from Kilnfile
//! configuration with [`multi_release_source`], which preserves the
//! configured preference order inside a [`MultiReleaseSource`].

pub mod community;
pub mod error;
pub mod factory;
pub mod hash;
pub mod http;
pub mod local;
pub mod local_directory;
pub mod multi;
pub mod object_store;
pub mod source;
pub mod upload;

pub use community::{CommunityIndexSource, IndexCatalog, IndexClient};
pub use error::FetchError;
pub use factory::{multi_release_source, object_store_for_bucket, release_source_from_config};
pub use http::{HttpIndexClient, HttpObjectStore};
pub use local::LocalDirectorySource;
pub use local_directory::{
    Confirmer, LocalReleaseDirectory, ManifestReader, ReleaseManifest, TarballManifestReader,
};
pub use multi::MultiReleaseSource;
pub use object_store::{ObjectStoreClient, ObjectStoreSource};
pub use source::{ReleaseSource, DEFAULT_DOWNLOAD_CONCURRENCY};
pub use upload::{upload_local_release, upload_target};
