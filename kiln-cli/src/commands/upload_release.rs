//! `kiln upload-release` — publish a release tarball.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use kiln_fetcher::{multi_release_source, upload_local_release, upload_target, TarballManifestReader};

use super::KilnfileArg;

/// Arguments for `kiln upload-release`.
#[derive(Args, Debug)]
pub struct UploadReleaseArgs {
    #[command(flatten)]
    pub kilnfile: KilnfileArg,

    /// Path to the release tarball.
    #[arg(long)]
    pub local_path: PathBuf,

    /// Id of a publishable release source.
    #[arg(long)]
    pub release_source: String,
}

impl UploadReleaseArgs {
    pub fn run(self) -> Result<()> {
        let kilnfile = self.kilnfile.load()?;
        let sources = multi_release_source(&kilnfile, self.kilnfile.base_dir(), false)
            .context("error configuring release sources")?;
        let target = upload_target(&sources, &self.release_source)?;

        let remote = upload_local_release(target, &TarballManifestReader, &self.local_path)
            .with_context(|| format!("upload failed for {}", self.local_path.display()))?;

        println!(
            "{} Uploaded {} to {} at {}",
            "✓".green().bold(),
            remote.id,
            remote.source_id,
            remote.remote_path
        );
        Ok(())
    }
}
