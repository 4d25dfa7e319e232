//! Storage bucket URL construction.
//!
//! Both the release manifest and every SDK archive are served from a single
//! storage root; archive paths in the manifest are relative to it.

use super::platform::Platform;

/// The storage root the public Flutter releases are served from.
pub const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com/flutter_infra/releases";

/// Base URL for manifest and archive downloads.
///
/// A trailing `/` is stripped on construction so that joined URLs always
/// contain exactly one separator between the root and the relative path.
///
/// # Examples
///
/// ```
/// use flutter_installer::release::platform::Platform;
/// use flutter_installer::release::storage::StorageRoot;
///
/// let root = StorageRoot::new("https://example.test/releases/");
/// assert_eq!(
///     root.manifest_url(Platform::Macos),
///     "https://example.test/releases/releases_macos.json"
/// );
/// assert_eq!(
///     root.archive_url("stable/macos/flutter.zip"),
///     "https://example.test/releases/stable/macos/flutter.zip"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot(String);

impl StorageRoot {
    /// Create a storage root from a base URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self(url.trim_end_matches('/').to_owned())
    }

    /// Return the root URL without a trailing separator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the release manifest for `platform`.
    #[must_use]
    pub fn manifest_url(&self, platform: Platform) -> String {
        format!("{}/{}", self.0, platform.manifest_filename())
    }

    /// URL of an archive given its manifest-relative path.
    #[must_use]
    pub fn archive_url(&self, archive: &str) -> String {
        format!("{}/{archive}", self.0)
    }
}

impl Default for StorageRoot {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_URL)
    }
}
