//! SDK archive extraction.
//!
//! Unpacks `.tar.xz` and `.zip` archives into a scratch directory with path
//! traversal protection to prevent zip-slip attacks. Unix permission bits and
//! symbolic links are preserved so the SDK's launch scripts stay executable.
//! Zip symlinks must point inside the destination, and no entry may be
//! written through a link that already exists there.

use super::kind::ArchiveKind;
use std::fs;
use std::io;
use std::path::{Component, Path};

/// File type bits of a unix mode.
const S_IFMT: u32 = 0o170_000;
/// File type bits identifying a symbolic link.
const S_IFLNK: u32 = 0o120_000;

/// Trait for extracting SDK archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use flutter_installer::archive::extraction::SdkExtractor;
///
/// let extractor = SdkExtractor;
/// // Use extractor.extract(archive_path, kind, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path`, read as `kind`, into `dest_dir`.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::EmptyArchive`]
    /// if nothing was extracted, and [`ExtractionError::Io`] or
    /// [`ExtractionError::Zip`] when the archive cannot be read or written.
    fn extract(
        &self,
        archive_path: &Path,
        kind: ArchiveKind,
        dest_dir: &Path,
    ) -> Result<usize, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container could not be read.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive produced no entries.
    #[error("archive contains no SDK files")]
    EmptyArchive,
}

/// Default extractor using `tar` + `xz2` and `zip`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkExtractor;

impl ArchiveExtractor for SdkExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        kind: ArchiveKind,
        dest_dir: &Path,
    ) -> Result<usize, ExtractionError> {
        let extracted = match kind {
            ArchiveKind::TarXz => extract_tar_xz(archive_path, dest_dir)?,
            ArchiveKind::Zip => extract_zip(archive_path, dest_dir)?,
        };
        log::debug!(
            "extracted {extracted} entries from {} into {}",
            archive_path.display(),
            dest_dir.display()
        );
        if extracted == 0 {
            return Err(ExtractionError::EmptyArchive);
        }
        Ok(extracted)
    }
}

fn extract_tar_xz(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractionError> {
    let file = fs::File::open(archive_path)?;
    let decoder = xz2::read::XzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    let mut extracted = 0;

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;

        if entry.unpack_in(dest_dir)? {
            extracted += 1;
        }
    }

    Ok(extracted)
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractionError> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut extracted = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let entry_path = entry
            .enclosed_name()
            .ok_or_else(|| ExtractionError::PathTraversal {
                path: entry.name().to_owned(),
            })?;
        validate_entry_path(&entry_path)?;
        ensure_no_symlink_ancestors(dest_dir, &entry_path)?;
        let dest_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
            extracted += 1;
            continue;
        }
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mode = entry.unix_mode();
        if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            let mut target = String::new();
            io::Read::read_to_string(&mut entry, &mut target)?;
            validate_link_target(&entry_path, &target)?;
            write_symlink(&target, &dest_path)?;
        } else {
            let mut out_file = fs::File::create(&dest_path)?;
            io::copy(&mut entry, &mut out_file)?;
            if let Some(mode) = mode {
                set_mode(&dest_path, mode)?;
            }
        }
        extracted += 1;
    }

    Ok(extracted)
}

#[cfg(unix)]
fn write_symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Without native symlinks the link target is stored as file content.
#[cfg(not(unix))]
fn write_symlink(target: &str, link: &Path) -> io::Result<()> {
    fs::write(link, target)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    if path.is_absolute() {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir | Component::Prefix(_)) {
            return Err(ExtractionError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Reject an entry whose path inside `dest_dir` already passes through, or
/// ends at, a symbolic link. Writing through such a link could land outside
/// the destination.
fn ensure_no_symlink_ancestors(
    dest_dir: &Path,
    entry_path: &Path,
) -> Result<(), ExtractionError> {
    let mut current = dest_dir.to_path_buf();
    for component in entry_path.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                return Err(ExtractionError::PathTraversal {
                    path: entry_path.display().to_string(),
                });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Validate that a symbolic link at `entry_path` pointing at `target` stays
/// inside the destination once resolved against the link's directory.
fn validate_link_target(entry_path: &Path, target: &str) -> Result<(), ExtractionError> {
    let escape = || ExtractionError::PathTraversal {
        path: format!("{} -> {target}", entry_path.display()),
    };
    let target_path = Path::new(target);
    if target_path.has_root() {
        return Err(escape());
    }

    let mut depth = entry_path.parent().map_or(0, |parent| {
        parent
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count()
    });
    for component in target_path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(escape)?,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(escape()),
        }
    }
    Ok(())
}
