//! Flutter SDK installation orchestrator.
//!
//! Fetches the release manifest, resolves the requested release, and either
//! reuses a cached SDK or downloads, extracts, and caches it. Publishing
//! `FLUTTER_ROOT` and the search path entries is the final step of
//! [`install`]; [`ensure_installed`] stops before it and may be called any
//! number of times for the same request.
//!
//! Every collaborator is injected through [`Collaborators`] so tests can
//! substitute mocks for the network, the extractor, and the cache.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::extraction::{ArchiveExtractor, ExtractionError};
use crate::archive::kind::ArchiveKind;
use crate::archive::validation::validate_archive_file;
use crate::cache::{TOOL_NAME, ToolCache};
use crate::error::{InstallerError, Result};
use crate::publish::{Publisher, publish_sdk};
use crate::release::channel::Channel;
use crate::release::download::ReleaseSource;
use crate::release::manifest::ReleaseManifest;
use crate::release::manifest_parser::parse_manifest;
use crate::release::platform::Platform;
use crate::release::resolver::{ResolvedRelease, Resolver, VersionRequest};
use crate::release::storage::StorageRoot;
use crate::reporter::{InstallEvent, Reporter};
use crate::scratch::provision_scratch_dir;

/// What to install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// Release channel to resolve against.
    pub channel: Channel,
    /// Latest or an exact version.
    pub version: VersionRequest,
    /// Platform whose manifest is consulted.
    pub platform: Platform,
    /// Storage root hosting manifests and archives.
    pub storage: StorageRoot,
}

impl InstallRequest {
    /// The manifest URL for this request.
    #[must_use]
    pub fn manifest_url(&self) -> String {
        self.storage.manifest_url(self.platform)
    }
}

/// The collaborators an installation runs against.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Manifest and archive transport.
    pub source: &'a dyn ReleaseSource,
    /// Archive extractor.
    pub extractor: &'a dyn ArchiveExtractor,
    /// Tool cache consulted before downloading.
    pub cache: &'a dyn ToolCache,
    /// Receiver for progress events.
    pub reporter: &'a dyn Reporter,
    /// Directory scratch extraction directories are created under.
    pub scratch_base: &'a Path,
}

/// The result of a successful [`ensure_installed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The tool cache already held the resolved version.
    Cached {
        /// The resolved release.
        release: ResolvedRelease,
        /// Path of the cached SDK root.
        path: PathBuf,
    },
    /// The SDK was downloaded, extracted, and cached.
    Installed {
        /// The resolved release.
        release: ResolvedRelease,
        /// Path of the newly cached SDK root.
        path: PathBuf,
    },
}

impl InstallOutcome {
    /// The SDK root.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Cached { path, .. } | Self::Installed { path, .. } => path,
        }
    }

    /// The release that was installed.
    #[must_use]
    pub fn release(&self) -> &ResolvedRelease {
        match self {
            Self::Cached { release, .. } | Self::Installed { release, .. } => release,
        }
    }

    /// Whether no download took place.
    #[must_use]
    pub fn was_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }
}

/// Fetch and parse the release manifest for `request`.
///
/// # Errors
///
/// Returns [`InstallerError::ManifestUnavailable`] when the manifest cannot be
/// fetched, is empty, or is not valid manifest JSON.
pub fn fetch_manifest(
    request: &InstallRequest,
    source: &dyn ReleaseSource,
    reporter: &dyn Reporter,
) -> Result<ReleaseManifest> {
    let url = request.manifest_url();
    let unavailable = |reason: String| InstallerError::ManifestUnavailable {
        url: url.clone(),
        reason,
    };

    let body = source
        .fetch_manifest(&url)
        .map_err(|e| unavailable(e.to_string()))?;
    let manifest = parse_manifest(&body).map_err(|e| unavailable(e.to_string()))?;

    reporter.report(&InstallEvent::ManifestFetched {
        url: url.clone(),
        releases: manifest.releases().len(),
    });
    Ok(manifest)
}

/// Fetch the manifest and resolve `request` against it.
///
/// # Errors
///
/// Returns [`InstallerError::ManifestUnavailable`] or
/// [`InstallerError::VersionNotFound`].
pub fn resolve_release(
    request: &InstallRequest,
    source: &dyn ReleaseSource,
    reporter: &dyn Reporter,
) -> Result<ResolvedRelease> {
    let manifest = fetch_manifest(request, source, reporter)?;
    Resolver::new(&request.storage, reporter).resolve(&manifest, request.channel, &request.version)
}

/// Make sure the requested SDK is present in the tool cache and return it.
///
/// # Errors
///
/// Returns any resolution, download, extraction, or cache failure. Nothing
/// is retried and no other version is substituted.
pub fn ensure_installed(
    request: &InstallRequest,
    collaborators: &Collaborators<'_>,
) -> Result<InstallOutcome> {
    let release = resolve_release(request, collaborators.source, collaborators.reporter)?;

    if let Some(path) = collaborators.cache.find(TOOL_NAME, release.version()) {
        collaborators.reporter.report(&InstallEvent::CacheHit {
            version: release.version().to_owned(),
            path: path.clone(),
        });
        return Ok(InstallOutcome::Cached { release, path });
    }

    let path = acquire(&release, collaborators)?;
    Ok(InstallOutcome::Installed { release, path })
}

/// Ensure the SDK is installed, then publish `FLUTTER_ROOT` and its search
/// path entries.
///
/// # Errors
///
/// Returns any [`ensure_installed`] failure, or
/// [`InstallerError::Publish`] when the environment cannot be updated.
pub fn install(
    request: &InstallRequest,
    collaborators: &Collaborators<'_>,
    publisher: &mut dyn Publisher,
) -> Result<InstallOutcome> {
    let outcome = ensure_installed(request, collaborators)?;
    publish_sdk(outcome.path(), publisher)?;
    collaborators.reporter.report(&InstallEvent::Published {
        root: outcome.path().to_path_buf(),
    });
    Ok(outcome)
}

/// Download, extract, and cache `release`, returning the cached SDK root.
fn acquire(release: &ResolvedRelease, collaborators: &Collaborators<'_>) -> Result<PathBuf> {
    let reporter = collaborators.reporter;

    // Step 1: Download into a private temporary directory.
    let download_dir = tempfile::tempdir()?;
    let filename = release.archive_filename();
    let archive_path = download_dir.path().join(filename);
    reporter.report(&InstallEvent::DownloadStarted {
        url: release.download_url().to_owned(),
    });
    collaborators
        .source
        .download_archive(release.download_url(), &archive_path)?;

    // Step 2: Extract into a fresh scratch directory.
    let scratch = provision_scratch_dir(collaborators.scratch_base)?;
    validate_archive_file(&archive_path)?;
    let kind = ArchiveKind::from_filename(filename);
    reporter.report(&InstallEvent::Extracting {
        archive: archive_path.clone(),
        kind,
        destination: scratch.clone(),
    });
    let entries = collaborators.extractor.extract(&archive_path, kind, &scratch)?;
    log::debug!("extracted {entries} entries into {}", scratch.display());

    // Step 3: Register the SDK root with the cache.
    let sdk_root = locate_sdk_root(&scratch)?;
    let cached = collaborators
        .cache
        .cache_dir(&sdk_root, TOOL_NAME, release.version())?;
    reporter.report(&InstallEvent::Cached {
        version: release.version().to_owned(),
        path: cached.clone(),
    });
    Ok(cached)
}

/// The SDK root inside an extraction directory: its first entry in directory
/// enumeration order.
///
/// # Errors
///
/// Returns [`ExtractionError::EmptyArchive`] when the directory is empty, or
/// [`InstallerError::Io`] when it cannot be listed.
pub fn locate_sdk_root(scratch: &Path) -> Result<PathBuf> {
    match fs::read_dir(scratch)?.next() {
        Some(entry) => Ok(entry?.path()),
        None => Err(ExtractionError::EmptyArchive.into()),
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
