//! # kiln-lock
//!
//! Lock reconciliation. Both algorithms work on an in-memory copy of the
//! lock and hand the result to a [`LockStore`] at most once, at the end.
//!
//! - [`update_release`] bumps a single named release.
//! - [`sync_with_local`] re-points every entry at freshly built local
//!   artifacts.

pub mod error;
pub mod prune;
pub mod store;
pub mod sync_local;
pub mod update;

#[cfg(test)]
mod testing;

pub use error::LockError;
pub use prune::extra_releases;
pub use store::{FileLockStore, LockStore};
pub use sync_local::{sync_with_local, SyncSummary};
pub use update::{update_release, UpdateOutcome, UpdateRequest};
