//! Tool cache for installed SDKs.
//!
//! Entries follow the CI runner tool-cache layout:
//! `{root}/{tool}/{version}/{arch}` plus a sibling `{arch}.complete` marker.
//! An entry directory without its marker is an interrupted install and is
//! not reported as a hit.

use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tool name used for every cache entry written by this installer.
pub const TOOL_NAME: &str = "flutter";

/// Trait for the content cache holding installed SDKs.
#[cfg_attr(test, mockall::automock)]
pub trait ToolCache {
    /// Return the cached path for `(tool, version)` when a complete entry
    /// exists.
    fn find(&self, tool: &str, version: &str) -> Option<PathBuf>;

    /// Store the directory at `source` as `(tool, version)` and return the
    /// canonical cached path.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for unusable keys and
    /// [`CacheError::Io`] when the entry cannot be written.
    fn cache_dir(
        &self,
        source: &Path,
        tool: &str,
        version: &str,
    ) -> std::result::Result<PathBuf, CacheError>;
}

/// Errors arising from tool cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The tool or version cannot be used as a path component.
    #[error("invalid cache key \"{key}\": {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// Writing the cache entry failed.
    #[error("failed to write cache entry {path}")]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Normalise a version into a cache key.
///
/// Surrounding whitespace and a single leading `v` are removed.
///
/// # Errors
///
/// Returns [`CacheError::InvalidKey`] when the result is empty or contains a
/// path separator or `..`.
///
/// # Examples
///
/// ```
/// use flutter_installer::cache::cache_key;
///
/// assert_eq!(cache_key(" v2.5.0 ").expect("valid key"), "2.5.0");
/// assert!(cache_key("../2.5.0").is_err());
/// ```
pub fn cache_key(value: &str) -> std::result::Result<String, CacheError> {
    let trimmed = value.trim();
    let key = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let reject = |reason: &str| CacheError::InvalidKey {
        key: value.to_owned(),
        reason: reason.to_owned(),
    };
    if key.is_empty() {
        return Err(reject("key must not be empty"));
    }
    if key.contains(['/', '\\']) {
        return Err(reject("key must not contain path separators"));
    }
    if key.contains("..") {
        return Err(reject("key must not contain \"..\""));
    }
    Ok(key.to_owned())
}

/// Filesystem-backed tool cache.
#[derive(Debug, Clone)]
pub struct FsToolCache {
    root: PathBuf,
    arch: String,
}

impl FsToolCache {
    /// Create a cache rooted at `root` for the host architecture.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_arch(root, host_arch())
    }

    /// Create a cache rooted at `root` for an explicit architecture segment.
    #[must_use]
    pub fn with_arch(root: impl Into<PathBuf>, arch: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            arch: arch.into(),
        }
    }

    /// The cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory an entry for `(tool, version)` lives in.
    ///
    /// A relative root is resolved against the current directory so the
    /// returned path is always absolute.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] when either part is unusable and
    /// [`CacheError::Io`] when a relative root cannot be resolved.
    pub fn entry_path(
        &self,
        tool: &str,
        version: &str,
    ) -> std::result::Result<PathBuf, CacheError> {
        let tool = cache_key(tool)?;
        let version = cache_key(version)?;
        let root = std::path::absolute(&self.root).map_err(|source| CacheError::Io {
            path: self.root.clone(),
            source,
        })?;
        Ok(root.join(tool).join(version).join(&self.arch))
    }

    fn marker_path(&self, entry: &Path) -> PathBuf {
        entry.with_file_name(format!("{}.complete", self.arch))
    }
}

impl ToolCache for FsToolCache {
    fn find(&self, tool: &str, version: &str) -> Option<PathBuf> {
        let entry = match self.entry_path(tool, version) {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("cache lookup skipped: {err}");
                return None;
            }
        };
        if entry.is_dir() && self.marker_path(&entry).is_file() {
            log::debug!("cache hit for {tool} {version} at {}", entry.display());
            Some(entry)
        } else {
            log::debug!("cache miss for {tool} {version}");
            None
        }
    }

    fn cache_dir(
        &self,
        source: &Path,
        tool: &str,
        version: &str,
    ) -> std::result::Result<PathBuf, CacheError> {
        let entry = self.entry_path(tool, version)?;
        let marker = self.marker_path(&entry);
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CacheError::Io { path, source }
        };

        remove_if_exists(&marker).map_err(io_err(&marker))?;
        if entry.exists() {
            fs::remove_dir_all(&entry).map_err(io_err(&entry))?;
        }
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        if let Err(err) = fs::rename(source, &entry) {
            log::debug!(
                "rename {} -> {} failed ({err}); copying instead",
                source.display(),
                entry.display()
            );
            copy_tree(source, &entry).map_err(io_err(&entry))?;
        }

        fs::write(&marker, b"").map_err(io_err(&marker))?;
        Ok(entry)
    }
}

/// Determine the tool cache root.
///
/// An explicit override wins, then `RUNNER_TOOL_CACHE`, then the per-user
/// data directory. The result is made absolute against the current directory.
///
/// # Errors
///
/// Returns [`InstallerError::CacheRootUnavailable`] when no candidate exists
/// or the chosen one cannot be made absolute.
pub fn tool_cache_root(dirs: &dyn BaseDirs, override_dir: Option<&Path>) -> Result<PathBuf> {
    let root = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs
            .runner_tool_cache()
            .or_else(|| dirs.data_dir().map(|dir| dir.join("tool-cache")))
            .ok_or_else(|| InstallerError::CacheRootUnavailable {
                reason: "RUNNER_TOOL_CACHE is unset and no data directory is available"
                    .to_owned(),
            })?,
    };
    std::path::absolute(&root).map_err(|err| InstallerError::CacheRootUnavailable {
        reason: format!("cannot resolve {}: {err}", root.display()),
    })
}

/// Architecture segment in the runner tool-cache naming scheme.
#[must_use]
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "x32",
        other => other,
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Recursively copy `from` to `to`, recreating symbolic links rather than
/// following them.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = to.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            copy_symlink(&src_path, &dst_path)?;
        } else if file_type.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::MockBaseDirs;
    use rstest::{fixture, rstest};

    struct CacheFixture {
        _temp: tempfile::TempDir,
        cache: FsToolCache,
        source: PathBuf,
    }

    #[fixture]
    fn fixture() -> CacheFixture {
        let temp = tempfile::tempdir().expect("temp dir");
        let source = temp.path().join("scratch").join("flutter");
        fs::create_dir_all(source.join("bin")).expect("create sdk");
        fs::write(source.join("bin").join("flutter"), b"#!/bin/sh\n").expect("write launcher");
        let cache = FsToolCache::with_arch(temp.path().join("cache"), "x64");
        CacheFixture {
            _temp: temp,
            cache,
            source,
        }
    }

    #[rstest]
    fn empty_cache_misses(fixture: CacheFixture) {
        assert_eq!(fixture.cache.find(TOOL_NAME, "2.5.0"), None);
    }

    #[rstest]
    fn cached_entry_is_found(fixture: CacheFixture) {
        let cached = fixture
            .cache
            .cache_dir(&fixture.source, TOOL_NAME, "2.5.0")
            .expect("cache entry");

        assert_eq!(
            cached,
            fixture.cache.root().join("flutter").join("2.5.0").join("x64")
        );
        assert!(cached.join("bin").join("flutter").is_file());
        assert!(
            fixture
                .cache
                .root()
                .join("flutter/2.5.0/x64.complete")
                .is_file()
        );
        assert_eq!(fixture.cache.find(TOOL_NAME, "2.5.0"), Some(cached));
    }

    #[rstest]
    fn entry_without_marker_is_not_a_hit(fixture: CacheFixture) {
        let entry = fixture
            .cache
            .entry_path(TOOL_NAME, "2.5.0")
            .expect("entry path");
        fs::create_dir_all(&entry).expect("create partial entry");
        assert_eq!(fixture.cache.find(TOOL_NAME, "2.5.0"), None);
    }

    #[rstest]
    fn stale_entry_is_replaced(fixture: CacheFixture) {
        let entry = fixture
            .cache
            .entry_path(TOOL_NAME, "2.5.0")
            .expect("entry path");
        fs::create_dir_all(&entry).expect("create partial entry");
        fs::write(entry.join("stale"), b"old").expect("write stale file");

        let cached = fixture
            .cache
            .cache_dir(&fixture.source, TOOL_NAME, "2.5.0")
            .expect("cache entry");

        assert!(!cached.join("stale").exists());
        assert!(cached.join("bin").join("flutter").is_file());
    }

    #[rstest]
    fn versions_with_leading_v_share_an_entry(fixture: CacheFixture) {
        let cached = fixture
            .cache
            .cache_dir(&fixture.source, TOOL_NAME, "v2.5.0")
            .expect("cache entry");
        assert_eq!(fixture.cache.find(TOOL_NAME, "2.5.0"), Some(cached));
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_v("v")]
    #[case::separator("2.5.0/evil")]
    #[case::backslash("2.5.0\\evil")]
    #[case::parent("..")]
    fn rejects_unusable_keys(#[case] version: &str) {
        assert!(matches!(
            cache_key(version),
            Err(CacheError::InvalidKey { .. })
        ));
    }

    #[rstest]
    fn invalid_version_is_a_miss(fixture: CacheFixture) {
        assert_eq!(fixture.cache.find(TOOL_NAME, "../2.5.0"), None);
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_preserves_symlinks() {
        let temp = tempfile::tempdir().expect("temp dir");
        let from = temp.path().join("from");
        fs::create_dir_all(from.join("bin")).expect("create source");
        fs::write(from.join("bin").join("dart"), b"dart").expect("write");
        std::os::unix::fs::symlink("bin/dart", from.join("dart")).expect("symlink");

        let to = temp.path().join("to");
        copy_tree(&from, &to).expect("copy");

        let link = fs::read_link(to.join("dart")).expect("link preserved");
        assert_eq!(link, PathBuf::from("bin/dart"));
        assert!(to.join("bin").join("dart").is_file());
    }

    #[test]
    fn relative_override_becomes_absolute() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_runner_tool_cache().never();
        let root = tool_cache_root(&dirs, Some(Path::new("relative-cache"))).expect("root");

        let cwd = std::env::current_dir().expect("current dir");
        assert!(root.is_absolute());
        assert_eq!(root, cwd.join("relative-cache"));
    }

    #[test]
    fn relative_root_yields_absolute_entry_path() {
        let cache = FsToolCache::with_arch("relative-cache", "x64");
        let entry = cache.entry_path(TOOL_NAME, "2.5.0").expect("entry path");

        let cwd = std::env::current_dir().expect("current dir");
        assert!(entry.is_absolute());
        assert_eq!(entry, cwd.join("relative-cache/flutter/2.5.0/x64"));
    }

    #[test]
    fn cache_root_prefers_override() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_runner_tool_cache().never();
        let root = tool_cache_root(&dirs, Some(Path::new("/override"))).expect("root");
        assert_eq!(root, PathBuf::from("/override"));
    }

    #[test]
    fn cache_root_uses_runner_tool_cache() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_runner_tool_cache()
            .returning(|| Some(PathBuf::from("/opt/hostedtoolcache")));
        dirs.expect_data_dir().never();
        let root = tool_cache_root(&dirs, None).expect("root");
        assert_eq!(root, PathBuf::from("/opt/hostedtoolcache"));
    }

    #[test]
    fn cache_root_falls_back_to_data_dir() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_runner_tool_cache().returning(|| None);
        dirs.expect_data_dir()
            .returning(|| Some(PathBuf::from("/home/test/.local/share/flutter-installer")));
        let root = tool_cache_root(&dirs, None).expect("root");
        assert_eq!(
            root,
            PathBuf::from("/home/test/.local/share/flutter-installer/tool-cache")
        );
    }

    #[test]
    fn cache_root_errors_without_candidates() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_runner_tool_cache().returning(|| None);
        dirs.expect_data_dir().returning(|| None);
        let err = tool_cache_root(&dirs, None).expect_err("no root");
        assert!(matches!(err, InstallerError::CacheRootUnavailable { .. }));
    }
}
