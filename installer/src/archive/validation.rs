//! Pre-extraction checks on the downloaded artefact.

use crate::error::{InstallerError, Result};
use std::path::Path;

/// Confirm that `path` names a regular file before it is extracted.
///
/// # Errors
///
/// - [`InstallerError::SdkPathInvalid`] when the path cannot be inspected
///   (for example because it does not exist).
/// - [`InstallerError::ExtractionTargetIsDirectory`] when it is a directory.
/// - [`InstallerError::NotAFile`] when it is any other non-regular entry.
pub fn validate_archive_file(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| InstallerError::SdkPathInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if metadata.is_dir() {
        return Err(InstallerError::ExtractionTargetIsDirectory {
            path: path.to_path_buf(),
        });
    }
    if !metadata.is_file() {
        return Err(InstallerError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
