//! Shared test utilities for the installer crate.
//!
//! Provides in-memory fakes for every collaborator trait together with
//! builders for real manifest JSON and SDK archives.

use crate::cache::{CacheError, ToolCache, cache_key};
use crate::publish::{PublishError, Publisher};
use crate::release::download::{DownloadError, ReleaseSource};
use crate::reporter::{InstallEvent, Reporter};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Reporter that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<InstallEvent>>,
}

impl RecordingReporter {
    /// A copy of the events reported so far.
    pub fn events(&self) -> Vec<InstallEvent> {
        self.events.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &InstallEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Release source serving a canned manifest and archives keyed by URL.
#[derive(Debug, Default)]
pub struct FakeReleaseSource {
    manifest: Option<String>,
    archives: HashMap<String, Vec<u8>>,
    manifest_requests: RefCell<Vec<String>>,
    downloads: RefCell<Vec<String>>,
}

impl FakeReleaseSource {
    /// A source whose manifest request fails with [`DownloadError::NotFound`].
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// A source serving `manifest` for every manifest URL.
    pub fn with_manifest(manifest: impl Into<String>) -> Self {
        Self {
            manifest: Some(manifest.into()),
            ..Self::default()
        }
    }

    /// Serve `bytes` for downloads of `url`.
    #[must_use]
    pub fn with_archive(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.archives.insert(url.into(), bytes);
        self
    }

    /// Manifest URLs requested so far.
    pub fn manifest_requests(&self) -> Vec<String> {
        self.manifest_requests.borrow().clone()
    }

    /// Archive URLs downloaded so far.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }
}

impl ReleaseSource for FakeReleaseSource {
    fn fetch_manifest(&self, url: &str) -> Result<String, DownloadError> {
        self.manifest_requests.borrow_mut().push(url.to_owned());
        self.manifest.clone().ok_or_else(|| DownloadError::NotFound {
            url: url.to_owned(),
        })
    }

    fn download_archive(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        self.downloads.borrow_mut().push(url.to_owned());
        let bytes = self.archives.get(url).ok_or_else(|| DownloadError::NotFound {
            url: url.to_owned(),
        })?;
        fs::write(dest, bytes)?;
        Ok(())
    }
}

/// Tool cache holding entries in memory.
///
/// Storing an entry records the source directory as the cached path without
/// moving it.
#[derive(Debug, Default)]
pub struct MemoryToolCache {
    entries: RefCell<HashMap<(String, String), PathBuf>>,
}

impl MemoryToolCache {
    /// Pre-populate an entry for `(tool, version)`.
    #[must_use]
    pub fn with_entry(self, tool: &str, version: &str, path: impl Into<PathBuf>) -> Self {
        self.entries
            .borrow_mut()
            .insert((tool.to_owned(), version.to_owned()), path.into());
        self
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl ToolCache for MemoryToolCache {
    fn find(&self, tool: &str, version: &str) -> Option<PathBuf> {
        let version = cache_key(version).ok()?;
        self.entries
            .borrow()
            .get(&(tool.to_owned(), version))
            .cloned()
    }

    fn cache_dir(&self, source: &Path, tool: &str, version: &str) -> Result<PathBuf, CacheError> {
        let version = cache_key(version)?;
        self.entries
            .borrow_mut()
            .insert((tool.to_owned(), version), source.to_path_buf());
        Ok(source.to_path_buf())
    }
}

/// Publisher that records exports and search path additions.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    /// Exported `(name, value)` pairs in call order.
    pub variables: Vec<(String, String)>,
    /// Search path additions in call order.
    pub paths: Vec<PathBuf>,
}

impl Publisher for RecordingPublisher {
    fn export_variable(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
        self.variables.push((name.to_owned(), value.to_owned()));
        Ok(())
    }

    fn add_path(&mut self, dir: &Path) -> Result<(), PublishError> {
        self.paths.push(dir.to_path_buf());
        Ok(())
    }
}

/// A manifest record for [`release_manifest_json`]:
/// `(hash, channel, version, archive)`.
pub type RecordSpec<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Build release manifest JSON from `(channel, hash)` current releases and
/// record tuples.
pub fn release_manifest_json(current: &[(&str, &str)], releases: &[RecordSpec<'_>]) -> String {
    let current_release: serde_json::Map<String, serde_json::Value> = current
        .iter()
        .map(|(channel, hash)| ((*channel).to_owned(), serde_json::json!(hash)))
        .collect();
    let releases: Vec<serde_json::Value> = releases
        .iter()
        .map(|(hash, channel, version, archive)| {
            serde_json::json!({
                "hash": hash,
                "channel": channel,
                "version": version,
                "release_date": "2021-09-08T00:00:00.000Z",
                "archive": archive,
                "sha256": "0000",
            })
        })
        .collect();
    serde_json::json!({
        "base_url": "https://storage.googleapis.com/flutter_infra/releases",
        "current_release": current_release,
        "releases": releases,
    })
    .to_string()
}

const LAUNCHER: &[u8] = b"#!/bin/sh\necho flutter\n";
const DART: &[u8] = b"#!/bin/sh\necho dart\n";
const VERSION: &[u8] = b"2.5.0\n";

/// Files in a minimal SDK tree: `(relative path, contents)`.
fn sdk_files(top: &str) -> [(String, &'static [u8]); 3] {
    [
        (format!("{top}/bin/flutter"), LAUNCHER),
        (format!("{top}/bin/cache/dart-sdk/bin/dart"), DART),
        (format!("{top}/version"), VERSION),
    ]
}

/// Relative link from `{top}/bin/dart` into the bundled Dart SDK.
const DART_LINK_TARGET: &str = "cache/dart-sdk/bin/dart";

fn sdk_dart_link(top: &str) -> String {
    format!("{top}/bin/dart")
}

fn sdk_dirs(top: &str) -> [String; 5] {
    [
        format!("{top}/"),
        format!("{top}/bin/"),
        format!("{top}/bin/cache/"),
        format!("{top}/bin/cache/dart-sdk/"),
        format!("{top}/bin/cache/dart-sdk/bin/"),
    ]
}

/// Build a zip archive containing a minimal SDK tree under `top`.
///
/// # Panics
///
/// Panics if the archive cannot be assembled.
pub fn sdk_zip_bytes(top: &str) -> Vec<u8> {
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for dir in sdk_dirs(top) {
        writer
            .add_directory(dir, SimpleFileOptions::default().unix_permissions(0o755))
            .expect("add directory");
    }
    for (path, contents) in sdk_files(top) {
        writer
            .start_file(path, SimpleFileOptions::default().unix_permissions(0o755))
            .expect("start file");
        writer.write_all(contents).expect("write file");
    }
    writer
        .add_symlink(sdk_dart_link(top), DART_LINK_TARGET, SimpleFileOptions::default())
        .expect("add symlink");
    writer.finish().expect("finish zip").into_inner()
}

/// Build an XZ-compressed tarball containing a minimal SDK tree under `top`.
///
/// # Panics
///
/// Panics if the archive cannot be assembled.
pub fn sdk_tar_xz_bytes(top: &str) -> Vec<u8> {
    let encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    let mut builder = tar::Builder::new(encoder);
    for dir in sdk_dirs(top) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        builder
            .append_data(&mut header, dir, std::io::empty())
            .expect("append directory");
    }
    for (path, contents) in sdk_files(top) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o755);
        header.set_size(contents.len() as u64);
        builder
            .append_data(&mut header, path, contents)
            .expect("append file");
    }
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_mode(0o777);
    header.set_size(0);
    builder
        .append_link(&mut header, sdk_dart_link(top), DART_LINK_TARGET)
        .expect("append symlink");
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish xz")
}

/// Write [`sdk_zip_bytes`] to `path`.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_sdk_zip(path: &Path, top: &str) {
    fs::write(path, sdk_zip_bytes(top)).expect("write zip");
}

/// Write [`sdk_tar_xz_bytes`] to `path`.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_sdk_tar_xz(path: &Path, top: &str) {
    fs::write(path, sdk_tar_xz_bytes(top)).expect("write tar.xz");
}
