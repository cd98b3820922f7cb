//! Error types for kiln-lock.

use thiserror::Error;

use kiln_core::{KilnfileError, ReleaseId};
use kiln_fetcher::FetchError;

/// All errors that can arise while reconciling the lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// The requested name is not pinned in the lock.
    #[error("no release named {name:?} exists in the Kilnfile.lock{hint}")]
    UnknownRelease { name: String, hint: &'static str },

    /// No configured source has the requested release.
    #[error("couldn't find {release} in any release source")]
    NotFound { release: ReleaseId },

    /// A local artifact has no matching lock entry.
    #[error("release {release} does not exist in the Kilnfile.lock")]
    NotInLock { release: ReleaseId },

    /// The target source could not derive a remote path for a release.
    #[error("unable to compute remote path for {release}")]
    RemotePath {
        release: ReleaseId,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Kilnfile(#[from] KilnfileError),
}

impl LockError {
    pub(crate) fn unknown_release(name: &str) -> Self {
        let hint = if name.ends_with("-release") {
            "; try removing the -release suffix"
        } else {
            ""
        };
        LockError::UnknownRelease {
            name: name.to_owned(),
            hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_hint_only_for_release_suffix() {
        let plain = LockError::unknown_release("uaa").to_string();
        assert_eq!(plain, "no release named \"uaa\" exists in the Kilnfile.lock");

        let suffixed = LockError::unknown_release("uaa-release").to_string();
        assert!(suffixed.ends_with("try removing the -release suffix"), "got: {suffixed}");
    }
}
