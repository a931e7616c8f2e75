//! Vendor command implementation
//!
//! The vendor command runs the full reconciliation pass:
//! 1. Load the configuration and the existing lock record.
//! 2. Reconcile each declared dependency (reuse local output or refetch).
//! 3. Write the resulting bundles under the output path.
//! 4. Persist the updated lock record.
//!
//! The lock file is only written after every dependency succeeded, so a
//! failed run leaves the previous lock state untouched.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use protovend::config;
use protovend::git::SystemGit;
use protovend::lock::{LockFile, LOCK_FILE};
use protovend::reconcile;

/// Arguments for the vendor command
#[derive(Args, Debug)]
pub struct VendorArgs {
    /// Path to the buf.yaml used when no protovend.yaml exists
    #[arg(short, long, value_name = "PATH", default_value = "buf.yaml")]
    pub config: PathBuf,

    /// Working directory
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub workdir: PathBuf,
}

/// Execute the vendor command
pub fn execute(args: VendorArgs) -> Result<()> {
    let workdir = args
        .workdir
        .canonicalize()
        .with_context(|| format!("resolving workdir {}", args.workdir.display()))?;

    let cfg = config::load(&workdir, &workdir.join(&args.config))
        .context("loading protovend configuration")?;

    let lock_path = workdir.join(LOCK_FILE);
    let mut lock = LockFile::read(&lock_path).context("reading lock file")?;

    let output_base = workdir.join(&cfg.path);
    config::ensure_output_dir(&output_base).context("creating output directory")?;

    reconcile::reconcile(&cfg, &mut lock, &output_base, &SystemGit)
        .context("reconciling dependencies")?;

    lock.write(&lock_path).context("writing lock file")?;
    log::info!("lock file written to {}", lock_path.display());

    Ok(())
}
