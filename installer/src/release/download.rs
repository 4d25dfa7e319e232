//! Manifest and archive download.
//!
//! Provides a trait-based abstraction over the storage bucket so the
//! installer can be exercised without network access.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Connection timeout for storage requests. Transfers themselves are not
/// bounded; SDK archives are several hundred megabytes.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every storage request.
const USER_AGENT: &str = concat!("flutter-installer/", env!("CARGO_PKG_VERSION"));

/// Trait for retrieving release data from the storage bucket.
///
/// # Examples
///
/// ```
/// use flutter_installer::release::download::HttpReleaseSource;
///
/// let source = HttpReleaseSource;
/// // Use source.fetch_manifest(url) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource {
    /// Fetch the body of the release manifest at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server reports an error
    /// status.
    fn fetch_manifest(&self, url: &str) -> Result<String, DownloadError>;

    /// Download the archive at `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or the file write fails.
    fn download_archive(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from storage downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested object does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based release source using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpReleaseSource;

impl ReleaseSource for HttpReleaseSource {
    fn fetch_manifest(&self, url: &str) -> Result<String, DownloadError> {
        log::debug!("fetching release manifest from {url}");
        let response = http_agent()
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::Http {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_archive(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        log::debug!("downloading {url} to {}", dest.display());
        let response = http_agent()
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        let written = std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(DownloadError::Io)?;
        log::trace!("wrote {written} bytes to {}", dest.display());
        Ok(())
    }
}

/// Shared `ureq` agent with connection timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
