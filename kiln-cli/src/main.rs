//! Kiln — pin, fetch, and publish BOSH releases for a product.
//!
//! # Usage
//!
//! ```text
//! kiln update-release --name <name> --version <version> [--releases-directory <dir>]
//!                     [--allow-only-publishable-releases] [--download-threads <n>]
//! kiln sync-with-local --release-source <id> [--releases-directory <dir>]
//! kiln upload-release --local-path <tarball> --release-source <id>
//! kiln push-release --name <name> --remote <bucket> --path <tarball>
//! kiln prune-releases [--releases-directory <dir>] [--no-confirm]
//! ```
//!
//! Every command takes `--kilnfile <path>` (default `Kilnfile`); the lock is
//! read from and written to `<kilnfile>.lock`. `--variables-file <yaml>` and
//! `--variable key=value` fill `$( variable "key" )` references in the
//! Kilnfile.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    prune_releases::PruneReleasesArgs, push_release::PushReleaseArgs,
    sync_with_local::SyncWithLocalArgs, update_release::UpdateReleaseArgs,
    upload_release::UploadReleaseArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Pin, fetch, and publish BOSH releases",
    long_about = None,
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve, download, and pin a new version of one release.
    UpdateRelease(UpdateReleaseArgs),

    /// Point the lock at the releases in a local directory.
    SyncWithLocal(SyncWithLocalArgs),

    /// Upload a release tarball to a publishable release source.
    UploadRelease(UploadReleaseArgs),

    /// Copy a release tarball into an s3 release source bucket.
    PushRelease(PushReleaseArgs),

    /// Delete local release tarballs the lock no longer references.
    PruneReleases(PruneReleasesArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::UpdateRelease(args) => args.run(),
        Commands::SyncWithLocal(args) => args.run(),
        Commands::UploadRelease(args) => args.run(),
        Commands::PushRelease(args) => args.run(),
        Commands::PruneReleases(args) => args.run(),
    }
}
