//! CLI argument definitions for the Flutter installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::error::Result;
use crate::install::InstallRequest;
use crate::release::channel::Channel;
use crate::release::platform::Platform;
use crate::release::resolver::VersionRequest;
use crate::release::storage::{DEFAULT_STORAGE_URL, StorageRoot};
use camino::Utf8PathBuf;
use clap::Parser;

/// Install the Flutter SDK.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "flutter-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install the Flutter SDK.\n\n",
    "Resolves a release from the Flutter release manifest, installs it into the ",
    "tool cache (reusing a cached copy when present), and exposes it to later ",
    "steps by exporting FLUTTER_ROOT and adding the Flutter and Dart bin ",
    "directories to PATH.\n\n",
    "Under GitHub Actions the exports are appended to the files named by ",
    "GITHUB_ENV and GITHUB_PATH. Elsewhere, or with --print-env, shell snippets ",
    "are printed instead.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the latest stable release:\n",
    "    $ flutter-installer\n\n",
    "  Install an exact beta release:\n",
    "    $ flutter-installer -c beta -f 2.6.0-5.2.pre\n\n",
    "  Preview the resolved release without downloading:\n",
    "    $ flutter-installer --dry-run",
))]
pub struct Cli {
    /// Release channel: stable, beta, or dev.
    #[arg(short, long, value_name = "CHANNEL", default_value = "stable")]
    pub channel: String,

    /// Exact Flutter version to install [default: latest on the channel].
    #[arg(short = 'f', long, value_name = "VERSION")]
    pub flutter_version: Option<String>,

    /// Platform whose release manifest is consulted: macos, linux, or windows.
    #[arg(long, value_name = "PLATFORM", default_value = "macos")]
    pub platform: String,

    /// Storage root hosting the release manifests and archives.
    #[arg(long, value_name = "URL", default_value = DEFAULT_STORAGE_URL)]
    pub storage_url: String,

    /// Tool cache root [default: RUNNER_TOOL_CACHE or platform data directory].
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Print shell snippets instead of writing GitHub Actions command files.
    #[arg(long)]
    pub print_env: bool,

    /// Resolve the release and exit without downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Convert the parsed flags into an [`InstallRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::InstallerError::InvalidInput`] for an unknown
    /// channel or platform.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::cli::Cli;
    /// use flutter_installer::release::channel::Channel;
    ///
    /// let cli = Cli {
    ///     channel: "beta".to_owned(),
    ///     ..Cli::default()
    /// };
    /// let request = cli.install_request().expect("valid request");
    /// assert_eq!(request.channel, Channel::Beta);
    /// ```
    pub fn install_request(&self) -> Result<InstallRequest> {
        Ok(InstallRequest {
            channel: self.channel.parse::<Channel>()?,
            version: VersionRequest::from_input(self.flutter_version.as_deref()),
            platform: self.platform.parse::<Platform>()?,
            storage: StorageRoot::new(self.storage_url.as_str()),
        })
    }

    /// The default `env_logger` filter for the requested verbosity.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Default for Cli {
    /// Creates a `Cli` matching an invocation with no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert_eq!(cli.channel, "stable");
    /// assert!(cli.flutter_version.is_none());
    /// ```
    fn default() -> Self {
        Self {
            channel: "stable".to_owned(),
            flutter_version: None,
            platform: "macos".to_owned(),
            storage_url: DEFAULT_STORAGE_URL.to_owned(),
            cache_dir: None,
            print_env: false,
            dry_run: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
