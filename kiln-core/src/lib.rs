//! Kiln core library — release data model, Kilnfile / Kilnfile.lock
//! persistence, errors.
//!
//! - [`types`] — release identities, requirements, lock entries, Kilnfile
//! - [`error`] — [`KilnfileError`]
//! - [`lockfile`] — load / save / consistency checks
//! - [`variables`] — `$( variable "name" )` interpolation

pub mod error;
pub mod lockfile;
pub mod types;
pub mod variables;

pub use error::KilnfileError;
pub use variables::Variables;
pub use types::{
    Kilnfile, KilnfileLock, KilnfileRelease, LocalRelease, ReleaseId, ReleaseLock,
    ReleaseSourceConfig, RemoteRelease, Requirement, SourceKind, Stemcell,
};
