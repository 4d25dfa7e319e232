//! Install progress reporting.
//!
//! The installer emits an [`InstallEvent`] at each stage instead of writing
//! to a global logger directly. Callers inject a [`Reporter`] to decide where
//! events go; tests record them.

use crate::archive::kind::ArchiveKind;
use crate::output::write_stderr_line;
use std::fmt;
use std::path::PathBuf;

/// A stage transition during installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    /// The release manifest was fetched and parsed.
    ManifestFetched {
        /// The manifest URL.
        url: String,
        /// Number of release records in the manifest.
        releases: usize,
    },
    /// A release record matched the request.
    ReleaseResolved {
        /// Channel of the matched record.
        channel: String,
        /// Version of the matched record.
        version: String,
        /// Archive URL derived from the record.
        download_url: String,
    },
    /// The tool cache already holds the resolved version.
    CacheHit {
        /// The resolved version.
        version: String,
        /// Path of the cached SDK.
        path: PathBuf,
    },
    /// The archive download started.
    DownloadStarted {
        /// The archive URL.
        url: String,
    },
    /// The downloaded archive is being extracted.
    Extracting {
        /// Path of the downloaded archive.
        archive: PathBuf,
        /// Format the archive is extracted as.
        kind: ArchiveKind,
        /// Scratch directory receiving the contents.
        destination: PathBuf,
    },
    /// The extracted SDK was registered in the tool cache.
    Cached {
        /// The cached version.
        version: String,
        /// Canonical path of the cache entry.
        path: PathBuf,
    },
    /// `FLUTTER_ROOT` and the search path entries were published.
    Published {
        /// The published SDK root.
        root: PathBuf,
    },
}

impl fmt::Display for InstallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManifestFetched { url, releases } => {
                write!(f, "Fetched release manifest {url} ({releases} releases)")
            }
            Self::ReleaseResolved {
                channel, version, ..
            } => write!(f, "Resolved Flutter {version} on channel {channel}"),
            Self::CacheHit { version, path } => {
                write!(f, "Flutter {version} found in cache {}", path.display())
            }
            Self::DownloadStarted { url } => write!(f, "Downloading Flutter from {url}..."),
            Self::Extracting {
                archive,
                kind,
                destination,
            } => write!(
                f,
                "Extracting {} as {kind} into {}...",
                archive.display(),
                destination.display()
            ),
            Self::Cached { version, path } => {
                write!(f, "Cached Flutter {version} at {}", path.display())
            }
            Self::Published { root } => write!(f, "FLUTTER_ROOT set to {}", root.display()),
        }
    }
}

/// Receiver for install progress events.
pub trait Reporter {
    /// Handle one event.
    fn report(&self, event: &InstallEvent);
}

/// Forwards every event to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &InstallEvent) {
        log::debug!("{event}");
    }
}

/// Logs every event and, unless quiet, echoes user-facing stages to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    /// Create a console reporter.
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: &InstallEvent) {
        LogReporter.report(event);
        if self.quiet || matches!(event, InstallEvent::ManifestFetched { .. }) {
            return;
        }
        write_stderr_line(&mut std::io::stderr(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::resolved(
        InstallEvent::ReleaseResolved {
            channel: "stable".to_owned(),
            version: "2.5.0".to_owned(),
            download_url: "https://example.test/flutter.zip".to_owned(),
        },
        "Resolved Flutter 2.5.0 on channel stable"
    )]
    #[case::cache_hit(
        InstallEvent::CacheHit {
            version: "2.5.0".to_owned(),
            path: PathBuf::from("/cache/flutter/2.5.0/x64"),
        },
        "found in cache /cache/flutter/2.5.0/x64"
    )]
    #[case::extracting(
        InstallEvent::Extracting {
            archive: PathBuf::from("/tmp/flutter.tar.xz"),
            kind: ArchiveKind::TarXz,
            destination: PathBuf::from("/tmp/temp_1"),
        },
        "as tar.xz into /tmp/temp_1"
    )]
    fn events_render_human_readable_messages(
        #[case] event: InstallEvent,
        #[case] expected: &str,
    ) {
        let text = event.to_string();
        assert!(text.contains(expected), "unexpected message: {text}");
    }
}
