//! `kiln push-release` — copy a tarball into an s3 release source bucket.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use kiln_fetcher::object_store_for_bucket;
use tracing::info;

use super::KilnfileArg;

/// Arguments for `kiln push-release`.
#[derive(Args, Debug)]
pub struct PushReleaseArgs {
    #[command(flatten)]
    pub kilnfile: KilnfileArg,

    /// Name of the release being pushed.
    #[arg(short, long)]
    pub name: String,

    /// Bucket of the s3 release source to push to.
    #[arg(long)]
    pub remote: String,

    /// Path to the release tarball, named like `my-rel-1.2.3.tgz`.
    #[arg(short, long)]
    pub path: PathBuf,
}

impl PushReleaseArgs {
    pub fn run(self) -> Result<()> {
        let kilnfile = self.kilnfile.load()?;
        let store = object_store_for_bucket(&kilnfile, &self.remote)
            .context("remote release source could not be found in Kilnfile")?;

        let key = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no file name", self.path.display()))?;

        info!(release = %self.name, bucket = %self.remote, key, "pushing release");
        store
            .put_file(key, &self.path)
            .context("upload failed")?;

        println!(
            "{} Pushed {} to {}/{}",
            "✓".green().bold(),
            self.name,
            self.remote,
            key
        );
        Ok(())
    }
}
