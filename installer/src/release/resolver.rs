//! Release resolution.
//!
//! Finds the manifest record matching a requested channel and version and
//! derives the archive URL from it. Records are scanned in manifest order and
//! the first match wins.

use super::channel::Channel;
use super::manifest::{ReleaseManifest, ReleaseRecord};
use super::storage::StorageRoot;
use crate::error::{InstallerError, Result};
use crate::reporter::{InstallEvent, Reporter};
use std::fmt;

/// The version half of an install request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionRequest {
    /// The current release of the channel.
    #[default]
    Latest,
    /// An exact version string.
    Exact(String),
}

impl VersionRequest {
    /// Interpret an optional version input.
    ///
    /// An absent, empty, or whitespace-only value requests the latest
    /// release; anything else is an exact version.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::release::resolver::VersionRequest;
    ///
    /// assert_eq!(VersionRequest::from_input(None), VersionRequest::Latest);
    /// assert_eq!(VersionRequest::from_input(Some("")), VersionRequest::Latest);
    /// assert_eq!(
    ///     VersionRequest::from_input(Some("2.5.0")),
    ///     VersionRequest::Exact("2.5.0".to_owned())
    /// );
    /// ```
    #[must_use]
    pub fn from_input(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            None | Some("") => Self::Latest,
            Some(version) => Self::Exact(version.to_owned()),
        }
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Exact(version) => f.write_str(version),
        }
    }
}

/// The release selected for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    channel: String,
    version: String,
    download_url: String,
}

impl ResolvedRelease {
    /// Derive the resolved release from a manifest record.
    #[must_use]
    pub fn from_record(record: &ReleaseRecord, storage: &StorageRoot) -> Self {
        Self {
            channel: record.channel().to_owned(),
            version: record.version().to_owned(),
            download_url: storage.archive_url(record.archive()),
        }
    }

    /// The channel of the selected record.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The version of the selected record; also the cache key.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The archive URL.
    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    /// The archive file name: the last path segment of the download URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::release::manifest::ReleaseRecord;
    /// use flutter_installer::release::resolver::ResolvedRelease;
    /// use flutter_installer::release::storage::StorageRoot;
    ///
    /// let record = ReleaseRecord::new(
    ///     "abc",
    ///     "stable",
    ///     "2.5.0",
    ///     "stable/macos/flutter_macos_2.5.0-stable.zip",
    /// );
    /// let release = ResolvedRelease::from_record(&record, &StorageRoot::default());
    /// assert_eq!(release.archive_filename(), "flutter_macos_2.5.0-stable.zip");
    /// ```
    #[must_use]
    pub fn archive_filename(&self) -> &str {
        self.download_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.download_url)
    }
}

/// Resolves requests against a manifest.
///
/// Holds the storage root used to derive archive URLs and the reporter that
/// receives [`InstallEvent::ReleaseResolved`].
pub struct Resolver<'a> {
    storage: &'a StorageRoot,
    reporter: &'a dyn Reporter,
}

impl<'a> Resolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(storage: &'a StorageRoot, reporter: &'a dyn Reporter) -> Self {
        Self { storage, reporter }
    }

    /// Resolve `request` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::VersionNotFound`] when no record matches.
    pub fn resolve(
        &self,
        manifest: &ReleaseManifest,
        channel: Channel,
        request: &VersionRequest,
    ) -> Result<ResolvedRelease> {
        match request {
            VersionRequest::Latest => self.resolve_latest(manifest, channel),
            VersionRequest::Exact(version) => self.resolve_exact(manifest, channel, version),
        }
    }

    /// Select the current release of `channel`.
    ///
    /// The record must carry the hash named by `current_release[channel]`
    /// and also be published on `channel`; a record on another channel with
    /// the same hash does not qualify.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::VersionNotFound`] when the channel has no
    /// current release or no record satisfies both conditions.
    pub fn resolve_latest(
        &self,
        manifest: &ReleaseManifest,
        channel: Channel,
    ) -> Result<ResolvedRelease> {
        let record = manifest.current_hash(channel).and_then(|hash| {
            manifest
                .releases()
                .iter()
                .find(|record| record.hash() == hash && record.is_on(channel))
        });
        self.finish(record, channel, VersionRequest::Latest)
    }

    /// Select the first record with `version` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::VersionNotFound`] when no record matches.
    pub fn resolve_exact(
        &self,
        manifest: &ReleaseManifest,
        channel: Channel,
        version: &str,
    ) -> Result<ResolvedRelease> {
        let record = manifest
            .releases()
            .iter()
            .find(|record| record.version() == version && record.is_on(channel));
        self.finish(record, channel, VersionRequest::Exact(version.to_owned()))
    }

    fn finish(
        &self,
        record: Option<&ReleaseRecord>,
        channel: Channel,
        request: VersionRequest,
    ) -> Result<ResolvedRelease> {
        let record = record.ok_or(InstallerError::VersionNotFound { channel, request })?;
        let release = ResolvedRelease::from_record(record, self.storage);
        self.reporter.report(&InstallEvent::ReleaseResolved {
            channel: release.channel().to_owned(),
            version: release.version().to_owned(),
            download_url: release.download_url().to_owned(),
        });
        Ok(release)
    }
}
