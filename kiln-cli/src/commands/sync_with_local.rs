//! `kiln sync-with-local` — point the lock at locally built releases.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use kiln_fetcher::{multi_release_source, LocalReleaseDirectory, TarballManifestReader};
use kiln_lock::{sync_with_local, FileLockStore};

use super::{KilnfileArg, TerminalConfirmer};

/// Arguments for `kiln sync-with-local`.
#[derive(Args, Debug)]
pub struct SyncWithLocalArgs {
    #[command(flatten)]
    pub kilnfile: KilnfileArg,

    /// Directory holding the release tarballs.
    #[arg(long, default_value = "releases")]
    pub releases_directory: PathBuf,

    /// Id of the release source the tarballs will be published to.
    #[arg(long)]
    pub release_source: String,
}

impl SyncWithLocalArgs {
    pub fn run(self) -> Result<()> {
        let (kilnfile, lock) = self.kilnfile.load_with_lock()?;
        let sources = multi_release_source(&kilnfile, self.kilnfile.base_dir(), false)
            .context("error configuring release sources")?;
        let target = sources.find_by_id(&self.release_source)?;

        let directory =
            LocalReleaseDirectory::new(Box::new(TarballManifestReader), Box::new(TerminalConfirmer));
        let local = directory
            .get_local_releases(&self.releases_directory)
            .context("error reading local releases")?;

        let store = FileLockStore::for_kilnfile(&self.kilnfile.path);
        let (_, summary) = sync_with_local(&lock, &local, target, &store)
            .context("sync-with-local failed")?;

        println!(
            "{} Synced {} release(s) with {}",
            "✓".green().bold(),
            summary.updated.len(),
            self.release_source
        );
        for id in &summary.untouched {
            println!("  {} {id} has no local tarball; left as-is", "·".dimmed());
        }
        Ok(())
    }
}
