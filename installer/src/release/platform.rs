//! Host platforms with a published release manifest.

use super::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// The platform whose release manifest is consulted.
///
/// The manifest for each platform lives at
/// `{storage_root}/releases_{platform}.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// `releases_macos.json`.
    #[default]
    Macos,
    /// `releases_linux.json`.
    Linux,
    /// `releases_windows.json`.
    Windows,
}

impl Platform {
    /// Every platform with a release manifest.
    pub const ALL: [Self; 3] = [Self::Macos, Self::Linux, Self::Windows];

    /// Return the platform name used in manifest file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Macos => "macos",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }

    /// Return the manifest file name for this platform.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::release::platform::Platform;
    ///
    /// assert_eq!(Platform::Macos.manifest_filename(), "releases_macos.json");
    /// ```
    #[must_use]
    pub fn manifest_filename(self) -> String {
        format!("releases_{}.json", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ReleaseError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == trimmed)
            .ok_or_else(|| ReleaseError::InvalidPlatform {
                value: value.to_owned(),
                expected: Self::ALL
                    .iter()
                    .map(|platform| platform.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
