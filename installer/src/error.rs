//! Error types for the Flutter installer.
//!
//! Every failure is fatal to the installation. Variants carry the URL, path,
//! or request that failed so the message printed by the CLI is actionable on
//! its own.

use crate::archive::extraction::ExtractionError;
use crate::cache::CacheError;
use crate::publish::PublishError;
use crate::release::channel::Channel;
use crate::release::download::DownloadError;
use crate::release::error::ReleaseError;
use crate::release::resolver::VersionRequest;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during installation.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// A channel or platform input was rejected.
    #[error(transparent)]
    InvalidInput(#[from] ReleaseError),

    /// The release manifest could not be fetched or parsed.
    #[error("failed to get Flutter release manifest {url}: {reason}")]
    ManifestUnavailable {
        /// The manifest URL.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// No release record matched the request.
    #[error("unable to find Flutter {request} on channel {channel}")]
    VersionNotFound {
        /// The requested channel.
        channel: Channel,
        /// The requested version, or latest.
        request: VersionRequest,
    },

    /// The downloaded artefact is not a regular file.
    #[error("Flutter SDK archive {path} is not a file")]
    NotAFile {
        /// The artefact path.
        path: PathBuf,
    },

    /// A directory was found where the downloaded archive was expected.
    #[error("failed to extract {path}: it is a directory")]
    ExtractionTargetIsDirectory {
        /// The artefact path.
        path: PathBuf,
    },

    /// The downloaded artefact could not be inspected.
    #[error("failed to extract {path}: {reason}")]
    SdkPathInvalid {
        /// The artefact path.
        path: PathBuf,
        /// Description of the lookup failure.
        reason: String,
    },

    /// The archive download failed.
    #[error("failed to download Flutter SDK: {0}")]
    DownloadFailed(#[from] DownloadError),

    /// The archive could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The tool cache could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// No tool cache root could be determined.
    #[error("could not determine tool cache directory: {reason}")]
    CacheRootUnavailable {
        /// Description of why no root was found.
        reason: String,
    },

    /// The environment variable or search path could not be published.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The scratch directory for extraction could not be created.
    #[error("failed to create scratch directory {path}")]
    ScratchDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
