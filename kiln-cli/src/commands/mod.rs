pub mod prune_releases;
pub mod push_release;
pub mod sync_with_local;
pub mod update_release;
pub mod upload_release;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Confirm;

use kiln_core::lockfile::{check_consistency, load_kilnfile_with, load_kilnfiles_with};
use kiln_core::{Kilnfile, KilnfileLock, Variables};
use kiln_fetcher::Confirmer;

/// `--kilnfile` and its variables, shared by every command.
#[derive(Args, Debug, Clone)]
pub struct KilnfileArg {
    /// Path to the Kilnfile; its lock is `<path>.lock`.
    #[arg(id = "kilnfile", long = "kilnfile", default_value = "Kilnfile")]
    pub path: PathBuf,

    /// Kilnfile variable as key=value (repeatable; overrides files).
    #[arg(long = "variable", value_name = "KEY=VALUE")]
    pub variables: Vec<String>,

    /// YAML file of Kilnfile variables (repeatable; later files win).
    #[arg(long = "variables-file", value_name = "PATH")]
    pub variables_files: Vec<PathBuf>,
}

impl KilnfileArg {
    /// Directory relative `directory:` entries resolve against.
    pub fn base_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn variables(&self) -> Result<Variables> {
        Variables::load(&self.variables_files, &self.variables)
            .context("error loading Kilnfile variables")
    }

    pub fn load(&self) -> Result<Kilnfile> {
        load_kilnfile_with(&self.path, &self.variables()?)
            .with_context(|| format!("error loading Kilnfile {}", self.path.display()))
    }

    /// Kilnfile plus lock, rejecting an inconsistent lock.
    pub fn load_with_lock(&self) -> Result<(Kilnfile, KilnfileLock)> {
        let (kilnfile, lock) = load_kilnfiles_with(&self.path, &self.variables()?)
            .with_context(|| format!("error loading Kilnfiles from {}", self.path.display()))?;
        check_consistency(&kilnfile, &lock)?;
        Ok((kilnfile, lock))
    }
}

/// Interactive yes/no on the terminal; anything but an explicit yes declines.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
