//! Local artifacts the lock no longer pins.

use kiln_core::{KilnfileLock, LocalRelease};

/// Releases in `local` whose name and version are not in `lock`, in their
/// original order.
pub fn extra_releases(lock: &KilnfileLock, local: &[LocalRelease]) -> Vec<LocalRelease> {
    local
        .iter()
        .filter(|r| !lock.contains(&r.id))
        .cloned()
        .collect()
}
