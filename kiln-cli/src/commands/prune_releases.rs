//! `kiln prune-releases` — remove tarballs the lock does not pin.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use kiln_fetcher::{LocalReleaseDirectory, TarballManifestReader};
use kiln_lock::extra_releases;

use super::{KilnfileArg, TerminalConfirmer};

/// Arguments for `kiln prune-releases`.
#[derive(Args, Debug)]
pub struct PruneReleasesArgs {
    #[command(flatten)]
    pub kilnfile: KilnfileArg,

    /// Directory holding the release tarballs.
    #[arg(long, default_value = "releases")]
    pub releases_directory: PathBuf,

    /// Delete without asking.
    #[arg(long)]
    pub no_confirm: bool,
}

impl PruneReleasesArgs {
    pub fn run(self) -> Result<()> {
        let (_, lock) = self.kilnfile.load_with_lock()?;
        let directory =
            LocalReleaseDirectory::new(Box::new(TarballManifestReader), Box::new(TerminalConfirmer));
        let local = directory
            .get_local_releases(&self.releases_directory)
            .context("error reading local releases")?;

        let extras = extra_releases(&lock, &local);
        if extras.is_empty() {
            println!("{} Nothing to prune", "✓".green().bold());
            return Ok(());
        }

        let deleted = directory.delete_extra_releases(&extras, self.no_confirm)?;
        if deleted.is_empty() {
            println!("{} Nothing deleted", "·".dimmed());
            return Ok(());
        }
        println!("{} Deleted {} release(s)", "✓".green().bold(), deleted.len());
        for id in &deleted {
            println!("  ✗  {id}");
        }
        Ok(())
    }
}
