//! Publishing the installed SDK to later build steps.
//!
//! The installer exports `FLUTTER_ROOT` and adds two directories to the
//! search path, in order: `{root}/bin` then `{root}/bin/cache/dart-sdk/bin`.
//! Under GitHub Actions both go to the runner's command files; elsewhere they
//! are collected and rendered as shell snippets.

use crate::dirs::BaseDirs;
use crate::output::ShellSnippet;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Environment variable naming the SDK root.
pub const FLUTTER_ROOT_VAR: &str = "FLUTTER_ROOT";

/// Sink for environment exports and search path additions.
#[cfg_attr(test, mockall::automock)]
pub trait Publisher {
    /// Export `name=value` to later steps.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the value cannot be recorded.
    fn export_variable(&mut self, name: &str, value: &str) -> Result<(), PublishError>;

    /// Add `dir` to the search path of later steps.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the directory cannot be recorded.
    fn add_path(&mut self, dir: &Path) -> Result<(), PublishError>;
}

/// Errors arising while publishing the SDK location.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The value would span several lines of a command file.
    #[error("value for {name} contains a newline")]
    MultilineValue {
        /// Variable name, or `PATH` for search path entries.
        name: String,
    },

    /// The path cannot be written as UTF-8.
    #[error("path {path} is not valid UTF-8")]
    NonUtf8Path {
        /// The rejected path.
        path: PathBuf,
    },

    /// Appending to a command file failed.
    #[error("failed to append to {path}")]
    Io {
        /// The command file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// The search path entries contributed by an SDK rooted at `root`, in
/// publication order.
#[must_use]
pub fn sdk_path_entries(root: &Path) -> [PathBuf; 2] {
    let bin = root.join("bin");
    let dart_bin = bin.join("cache").join("dart-sdk").join("bin");
    [bin, dart_bin]
}

/// Export `FLUTTER_ROOT` and add the SDK's search path entries.
///
/// # Errors
///
/// Returns the first [`PublishError`] raised by the publisher.
pub fn publish_sdk(root: &Path, publisher: &mut dyn Publisher) -> Result<(), PublishError> {
    let root_str = utf8(root)?;
    publisher.export_variable(FLUTTER_ROOT_VAR, root_str.as_str())?;
    for dir in sdk_path_entries(root) {
        publisher.add_path(&dir)?;
    }
    Ok(())
}

fn utf8(path: &Path) -> Result<&Utf8Path, PublishError> {
    Utf8Path::from_path(path).ok_or_else(|| PublishError::NonUtf8Path {
        path: path.to_path_buf(),
    })
}

fn single_line(name: &str, value: &str) -> Result<(), PublishError> {
    if value.contains(['\n', '\r']) {
        return Err(PublishError::MultilineValue {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Appends to the runner's `GITHUB_ENV` and `GITHUB_PATH` files.
#[derive(Debug, Clone)]
pub struct GithubActionsPublisher {
    env_file: PathBuf,
    path_file: PathBuf,
}

impl GithubActionsPublisher {
    /// Create a publisher writing the given command files.
    #[must_use]
    pub fn new(env_file: impl Into<PathBuf>, path_file: impl Into<PathBuf>) -> Self {
        Self {
            env_file: env_file.into(),
            path_file: path_file.into(),
        }
    }

    /// Create a publisher from the runner environment, if both command files
    /// are configured.
    #[must_use]
    pub fn from_dirs(dirs: &dyn BaseDirs) -> Option<Self> {
        Some(Self::new(dirs.github_env_file()?, dirs.github_path_file()?))
    }

    fn append_line(file: &Path, line: &str) -> Result<(), PublishError> {
        let io_err = |source| PublishError::Io {
            path: file.to_path_buf(),
            source,
        };
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(io_err)?;
        writeln!(handle, "{line}").map_err(io_err)
    }
}

impl Publisher for GithubActionsPublisher {
    fn export_variable(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
        single_line(name, value)?;
        log::debug!("exporting {name} via {}", self.env_file.display());
        Self::append_line(&self.env_file, &format!("{name}={value}"))
    }

    fn add_path(&mut self, dir: &Path) -> Result<(), PublishError> {
        let dir = utf8(dir)?;
        single_line("PATH", dir.as_str())?;
        log::debug!("adding {dir} via {}", self.path_file.display());
        Self::append_line(&self.path_file, dir.as_str())
    }
}

/// Collects exports for rendering as shell configuration.
#[derive(Debug, Clone, Default)]
pub struct ShellPublisher {
    variables: Vec<(String, String)>,
    paths: Vec<Utf8PathBuf>,
}

impl ShellPublisher {
    /// Create an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the collected exports.
    #[must_use]
    pub fn snippet(&self) -> ShellSnippet {
        ShellSnippet::new(&self.variables, &self.paths)
    }
}

impl Publisher for ShellPublisher {
    fn export_variable(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
        single_line(name, value)?;
        self.variables.push((name.to_owned(), value.to_owned()));
        Ok(())
    }

    fn add_path(&mut self, dir: &Path) -> Result<(), PublishError> {
        let dir = utf8(dir)?;
        single_line("PATH", dir.as_str())?;
        self.paths.push(dir.to_path_buf());
        Ok(())
    }
}
