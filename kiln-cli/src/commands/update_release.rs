//! `kiln update-release` — bump one release in the lock.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use kiln_fetcher::multi_release_source;
use kiln_lock::{update_release, FileLockStore, UpdateOutcome, UpdateRequest};

use super::KilnfileArg;

/// Arguments for `kiln update-release`.
#[derive(Args, Debug)]
pub struct UpdateReleaseArgs {
    #[command(flatten)]
    pub kilnfile: KilnfileArg,

    /// Name of the release to update.
    #[arg(short, long)]
    pub name: String,

    /// Version to pin.
    #[arg(long)]
    pub version: String,

    /// Where downloaded releases are stored.
    #[arg(long, default_value = "releases")]
    pub releases_directory: PathBuf,

    /// Ignore release sources not marked publishable.
    #[arg(long)]
    pub allow_only_publishable_releases: bool,

    /// Parallel part requests for the download (0 uses the default).
    #[arg(long, default_value_t = 0)]
    pub download_threads: usize,
}

impl UpdateReleaseArgs {
    pub fn run(self) -> Result<()> {
        let (kilnfile, lock) = self.kilnfile.load_with_lock()?;
        let sources = multi_release_source(
            &kilnfile,
            self.kilnfile.base_dir(),
            self.allow_only_publishable_releases,
        )
        .context("error configuring release sources")?;

        std::fs::create_dir_all(&self.releases_directory).with_context(|| {
            format!(
                "could not create releases directory {}",
                self.releases_directory.display()
            )
        })?;

        let request = UpdateRequest {
            name: self.name.clone(),
            version: self.version.clone(),
            releases_dir: self.releases_directory.clone(),
            concurrency: self.download_threads,
        };
        let store = FileLockStore::for_kilnfile(&self.kilnfile.path);
        let (_, outcome) = update_release(&lock, &sources, &request, &store)
            .with_context(|| format!("update-release failed for {}", self.name))?;

        match &outcome {
            UpdateOutcome::Unchanged { .. } => println!("{} {outcome}", "·".dimmed()),
            UpdateOutcome::Committed { .. } => println!("{} {outcome}", "✓".green().bold()),
        }
        Ok(())
    }
}
