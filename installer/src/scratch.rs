//! Scratch directories for archive extraction.
//!
//! Each install extracts into a fresh `temp_{n}` directory beneath the
//! runner's temporary directory, where `n` is a random number below two
//! billion.

use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Base directory used when `RUNNER_TEMP` is not set.
pub const DEFAULT_TEMP_BASE: &str = "/Users/actions/temp";

/// Exclusive upper bound of the numeric scratch suffix.
const SUFFIX_BOUND: u32 = 2_000_000_000;

/// The directory scratch directories are created under.
#[must_use]
pub fn scratch_base(dirs: &dyn BaseDirs) -> PathBuf {
    dirs.runner_temp()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_BASE))
}

/// Name of the scratch directory for suffix `n`.
#[must_use]
pub fn scratch_dir_name(n: u32) -> String {
    format!("temp_{n}")
}

/// Create a fresh scratch directory beneath `base`.
///
/// # Errors
///
/// Returns [`InstallerError::ScratchDir`] when the directory cannot be
/// created.
pub fn provision_scratch_dir(base: &Path) -> Result<PathBuf> {
    provision_scratch_dir_with(base, &mut rand::thread_rng())
}

/// Create a scratch directory beneath `base` using the supplied random
/// source.
///
/// # Errors
///
/// Returns [`InstallerError::ScratchDir`] when the directory cannot be
/// created.
pub fn provision_scratch_dir_with(base: &Path, rng: &mut impl Rng) -> Result<PathBuf> {
    let dir = base.join(scratch_dir_name(rng.gen_range(0..SUFFIX_BOUND)));
    fs::create_dir_all(&dir).map_err(|source| InstallerError::ScratchDir {
        path: dir.clone(),
        source,
    })?;
    log::debug!("provisioned scratch directory {}", dir.display());
    Ok(dir)
}
