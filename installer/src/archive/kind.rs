//! Archive format selection.

use std::fmt;

/// The container format of an SDK archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// XZ-compressed tarball.
    TarXz,
    /// Zip archive.
    Zip,
}

impl ArchiveKind {
    /// Choose the format from the archive's original file name.
    ///
    /// Names ending in `tar.xz` are tarballs; every other name is treated as
    /// a zip archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use flutter_installer::archive::kind::ArchiveKind;
    ///
    /// assert_eq!(ArchiveKind::from_filename("flutter_macos_2.0.tar.xz"), ArchiveKind::TarXz);
    /// assert_eq!(ArchiveKind::from_filename("flutter_macos_2.0.zip"), ArchiveKind::Zip);
    /// ```
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with("tar.xz") {
            Self::TarXz
        } else {
            Self::Zip
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TarXz => f.write_str("tar.xz"),
            Self::Zip => f.write_str("zip"),
        }
    }
}
