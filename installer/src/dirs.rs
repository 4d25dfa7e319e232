//! Directory and environment resolution.
//!
//! Wraps the environment variables the CI runner provides, and the
//! platform data directory from `directories-next`, behind a trait so that
//! tests can inject fixed locations.

use std::ffi::OsString;
use std::path::PathBuf;

/// Runner-provided temporary directory.
pub const RUNNER_TEMP: &str = "RUNNER_TEMP";
/// Runner-provided tool cache root.
pub const RUNNER_TOOL_CACHE: &str = "RUNNER_TOOL_CACHE";
/// File that accumulates environment variable exports for later steps.
pub const GITHUB_ENV: &str = "GITHUB_ENV";
/// File that accumulates search path additions for later steps.
pub const GITHUB_PATH: &str = "GITHUB_PATH";

/// Source of the directories the installer reads from and writes to.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The runner's temporary directory, if set and non-empty.
    fn runner_temp(&self) -> Option<PathBuf>;

    /// The runner's tool cache root, if set and non-empty.
    fn runner_tool_cache(&self) -> Option<PathBuf>;

    /// The per-user data directory for this installer.
    fn data_dir(&self) -> Option<PathBuf>;

    /// The file named by `GITHUB_ENV`, if set and non-empty.
    fn github_env_file(&self) -> Option<PathBuf>;

    /// The file named by `GITHUB_PATH`, if set and non-empty.
    fn github_path_file(&self) -> Option<PathBuf>;
}

/// Reads directories from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn runner_temp(&self) -> Option<PathBuf> {
        env_path(RUNNER_TEMP)
    }

    fn runner_tool_cache(&self) -> Option<PathBuf> {
        env_path(RUNNER_TOOL_CACHE)
    }

    fn data_dir(&self) -> Option<PathBuf> {
        directories_next::ProjectDirs::from("", "", "flutter-installer")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn github_env_file(&self) -> Option<PathBuf> {
        env_path(GITHUB_ENV)
    }

    fn github_path_file(&self) -> Option<PathBuf> {
        env_path(GITHUB_PATH)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value: &OsString| !value.is_empty())
        .map(PathBuf::from)
}
