//! Unit tests for installation orchestration.

use super::*;
use crate::archive::extraction::MockArchiveExtractor;
use crate::cache::MockToolCache;
use crate::release::download::{DownloadError, MockReleaseSource};
use crate::test_utils::{RecordingPublisher, RecordingReporter, release_manifest_json};
use rstest::rstest;

const STORAGE: &str = "https://storage.example.test/releases";
const ZIP_ARCHIVE: &str = "stable/macos/flutter_macos_2.5.0-stable.zip";
const TAR_ARCHIVE: &str = "stable/linux/flutter_linux_2.5.0-stable.tar.xz";

fn request(version: Option<&str>) -> InstallRequest {
    InstallRequest {
        channel: Channel::Stable,
        version: VersionRequest::from_input(version),
        platform: Platform::Macos,
        storage: StorageRoot::new(STORAGE),
    }
}

fn manifest_with(archive: &str) -> String {
    release_manifest_json(
        &[("stable", "abc123"), ("beta", "def456")],
        &[
            ("def456", "beta", "2.6.0-5.2.pre", "beta/macos/flutter_2.6.0.zip"),
            ("abc123", "stable", "2.5.0", archive),
        ],
    )
}

fn source_serving(manifest: String) -> MockReleaseSource {
    let mut source = MockReleaseSource::new();
    source
        .expect_fetch_manifest()
        .returning(move |_| Ok(manifest.clone()));
    source
}

fn expect_archive_download(source: &mut MockReleaseSource) {
    source
        .expect_download_archive()
        .times(1)
        .returning(|_url, dest| std::fs::write(dest, b"archive").map_err(DownloadError::Io));
}

/// An extractor that lays out a single `flutter/bin` tree.
fn sdk_extractor(expected_kind: ArchiveKind) -> MockArchiveExtractor {
    let mut extractor = MockArchiveExtractor::new();
    extractor
        .expect_extract()
        .withf(move |archive, kind, _dest| archive.is_file() && *kind == expected_kind)
        .times(1)
        .returning(|_archive, _kind, dest| {
            std::fs::create_dir_all(dest.join("flutter").join("bin")).map_err(ExtractionError::Io)?;
            Ok(2)
        });
    extractor
}

fn missing_cache() -> MockToolCache {
    let mut cache = MockToolCache::new();
    cache.expect_find().returning(|_, _| None);
    cache
}

fn caching_cache() -> MockToolCache {
    let mut cache = missing_cache();
    cache
        .expect_cache_dir()
        .withf(|source, tool, version| {
            source.ends_with("flutter") && tool == TOOL_NAME && version == "2.5.0"
        })
        .times(1)
        .returning(|_, _, _| Ok(PathBuf::from("/cache/flutter/2.5.0/x64")));
    cache
}

fn collaborators<'a>(
    source: &'a MockReleaseSource,
    extractor: &'a MockArchiveExtractor,
    cache: &'a MockToolCache,
    reporter: &'a RecordingReporter,
    scratch_base: &'a Path,
) -> Collaborators<'a> {
    Collaborators {
        source,
        extractor,
        cache,
        reporter,
        scratch_base,
    }
}

#[test]
fn manifest_url_follows_platform() {
    let mut request = request(None);
    request.platform = Platform::Linux;
    assert_eq!(
        request.manifest_url(),
        "https://storage.example.test/releases/releases_linux.json"
    );
}

#[test]
fn fresh_install_downloads_extracts_and_caches() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = source_serving(manifest_with(ZIP_ARCHIVE));
    source
        .expect_download_archive()
        .withf(|url, _dest| url == format!("{STORAGE}/{ZIP_ARCHIVE}"))
        .times(1)
        .returning(|_url, dest| {
            assert!(dest.ends_with("flutter_macos_2.5.0-stable.zip"));
            std::fs::write(dest, b"archive").map_err(DownloadError::Io)
        });
    let extractor = sdk_extractor(ArchiveKind::Zip);
    let cache = caching_cache();
    let reporter = RecordingReporter::default();

    let outcome = ensure_installed(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect("install succeeds");

    assert!(!outcome.was_cached());
    assert_eq!(outcome.path(), Path::new("/cache/flutter/2.5.0/x64"));
    assert_eq!(outcome.release().version(), "2.5.0");

    let events = reporter.events();
    assert!(matches!(events.first(), Some(InstallEvent::ManifestFetched { releases: 2, .. })));
    assert!(events.iter().any(|e| matches!(e, InstallEvent::DownloadStarted { .. })));
    assert!(matches!(events.last(), Some(InstallEvent::Cached { version, .. }) if version == "2.5.0"));
}

#[test]
fn cache_hit_skips_download() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = source_serving(manifest_with(ZIP_ARCHIVE));
    source.expect_download_archive().times(0);
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().times(0);
    let mut cache = MockToolCache::new();
    cache
        .expect_find()
        .withf(|tool, version| tool == TOOL_NAME && version == "2.5.0")
        .returning(|_, _| Some(PathBuf::from("/cache/flutter/2.5.0/x64")));
    cache.expect_cache_dir().times(0);
    let reporter = RecordingReporter::default();

    let outcome = ensure_installed(
        &request(Some("2.5.0")),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect("cached install succeeds");

    assert!(outcome.was_cached());
    assert_eq!(outcome.path(), Path::new("/cache/flutter/2.5.0/x64"));
    assert!(
        reporter
            .events()
            .iter()
            .any(|e| matches!(e, InstallEvent::CacheHit { .. }))
    );
}

#[rstest]
#[case::zip(ZIP_ARCHIVE, ArchiveKind::Zip)]
#[case::tar_xz(TAR_ARCHIVE, ArchiveKind::TarXz)]
fn archive_kind_follows_download_name(#[case] archive: &str, #[case] kind: ArchiveKind) {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = source_serving(manifest_with(archive));
    expect_archive_download(&mut source);
    let extractor = sdk_extractor(kind);
    let cache = caching_cache();
    let reporter = RecordingReporter::default();

    ensure_installed(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect("install succeeds");

    assert!(reporter.events().iter().any(
        |e| matches!(e, InstallEvent::Extracting { kind: reported, .. } if *reported == kind)
    ));
}

#[test]
fn extracts_into_numbered_scratch_directory() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let base = scratch.path().to_path_buf();
    let mut source = source_serving(manifest_with(ZIP_ARCHIVE));
    expect_archive_download(&mut source);
    let mut extractor = MockArchiveExtractor::new();
    extractor
        .expect_extract()
        .withf(move |_archive, _kind, dest| {
            dest.parent() == Some(base.as_path())
                && dest
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("temp_"))
        })
        .times(1)
        .returning(|_archive, _kind, dest| {
            std::fs::create_dir_all(dest.join("flutter")).map_err(ExtractionError::Io)?;
            Ok(1)
        });
    let cache = caching_cache();
    let reporter = RecordingReporter::default();

    ensure_installed(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect("install succeeds");
}

#[test]
fn empty_extraction_fails() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = source_serving(manifest_with(ZIP_ARCHIVE));
    expect_archive_download(&mut source);
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().returning(|_, _, _| Ok(0));
    let mut cache = missing_cache();
    cache.expect_cache_dir().times(0);
    let reporter = RecordingReporter::default();

    let err = ensure_installed(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect_err("nothing to cache");

    assert!(matches!(
        err,
        InstallerError::Extraction(ExtractionError::EmptyArchive)
    ));
}

#[rstest]
#[case::unreachable(
    Err(DownloadError::Http { url: "u".to_owned(), reason: "connection refused".to_owned() }),
    "connection refused"
)]
#[case::empty(Ok(String::new()), "empty")]
#[case::not_json(Ok("<html>".to_owned()), "parse error")]
fn unusable_manifest_is_unavailable(
    #[case] response: std::result::Result<String, DownloadError>,
    #[case] expected_reason: &str,
) {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = MockReleaseSource::new();
    source
        .expect_fetch_manifest()
        .withf(|url| url == format!("{STORAGE}/releases_macos.json"))
        .return_once(move |_| response);
    source.expect_download_archive().times(0);
    let extractor = MockArchiveExtractor::new();
    let cache = MockToolCache::new();
    let reporter = RecordingReporter::default();

    let err = ensure_installed(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect_err("manifest unusable");

    match err {
        InstallerError::ManifestUnavailable { url, reason } => {
            assert!(url.ends_with("releases_macos.json"));
            assert!(reason.contains(expected_reason), "reason: {reason}");
        }
        other => panic!("expected ManifestUnavailable, got {other:?}"),
    }
}

#[test]
fn unknown_version_fails_before_any_download() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = source_serving(manifest_with(ZIP_ARCHIVE));
    source.expect_download_archive().times(0);
    let extractor = MockArchiveExtractor::new();
    let mut cache = MockToolCache::new();
    cache.expect_find().times(0);
    let reporter = RecordingReporter::default();

    let err = ensure_installed(
        &request(Some("9.9.9")),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect_err("9.9.9 not in manifest");

    assert!(matches!(err, InstallerError::VersionNotFound { .. }));
    assert_eq!(err.to_string(), "unable to find Flutter 9.9.9 on channel stable");
}

#[test]
fn download_failure_is_propagated() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut source = source_serving(manifest_with(ZIP_ARCHIVE));
    source.expect_download_archive().returning(|url, _| {
        Err(DownloadError::NotFound {
            url: url.to_owned(),
        })
    });
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().times(0);
    let cache = missing_cache();
    let reporter = RecordingReporter::default();

    let err = ensure_installed(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
    )
    .expect_err("download fails");

    assert!(matches!(
        err,
        InstallerError::DownloadFailed(DownloadError::NotFound { .. })
    ));
}

#[test]
fn install_publishes_cached_root() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let source = source_serving(manifest_with(ZIP_ARCHIVE));
    let extractor = MockArchiveExtractor::new();
    let mut cache = MockToolCache::new();
    cache
        .expect_find()
        .returning(|_, _| Some(PathBuf::from("/cache/flutter/2.5.0/x64")));
    let reporter = RecordingReporter::default();
    let mut publisher = RecordingPublisher::default();

    install(
        &request(None),
        &collaborators(&source, &extractor, &cache, &reporter, scratch.path()),
        &mut publisher,
    )
    .expect("install succeeds");

    assert_eq!(
        publisher.variables,
        vec![(
            "FLUTTER_ROOT".to_owned(),
            "/cache/flutter/2.5.0/x64".to_owned()
        )]
    );
    assert_eq!(
        publisher.paths,
        vec![
            PathBuf::from("/cache/flutter/2.5.0/x64/bin"),
            PathBuf::from("/cache/flutter/2.5.0/x64/bin/cache/dart-sdk/bin"),
        ]
    );
    assert!(matches!(
        reporter.events().last(),
        Some(InstallEvent::Published { .. })
    ));
}

#[test]
fn locate_sdk_root_takes_first_entry() {
    let scratch = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir(scratch.path().join("flutter")).expect("create sdk dir");
    let root = locate_sdk_root(scratch.path()).expect("root");
    assert_eq!(root, scratch.path().join("flutter"));
}

#[test]
fn locate_sdk_root_rejects_empty_directory() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let err = locate_sdk_root(scratch.path()).expect_err("empty");
    assert!(matches!(
        err,
        InstallerError::Extraction(ExtractionError::EmptyArchive)
    ));
}

#[test]
fn repeated_ensure_installed_reuses_cache() {
    use crate::archive::extraction::SdkExtractor;
    use crate::test_utils::{FakeReleaseSource, MemoryToolCache, sdk_zip_bytes};

    let scratch = tempfile::tempdir().expect("temp dir");
    let source = FakeReleaseSource::with_manifest(manifest_with(ZIP_ARCHIVE))
        .with_archive(format!("{STORAGE}/{ZIP_ARCHIVE}"), sdk_zip_bytes("flutter"));
    let cache = MemoryToolCache::default();
    let reporter = RecordingReporter::default();
    let collaborators = Collaborators {
        source: &source,
        extractor: &SdkExtractor,
        cache: &cache,
        reporter: &reporter,
        scratch_base: scratch.path(),
    };

    let first = ensure_installed(&request(None), &collaborators).expect("first install");
    let second = ensure_installed(&request(None), &collaborators).expect("second install");

    assert!(!first.was_cached());
    assert!(second.was_cached());
    assert_eq!(first.path(), second.path());
    assert!(first.path().join("bin").join("flutter").is_file());
    assert_eq!(cache.len(), 1);
    assert_eq!(source.downloads().len(), 1);
    assert_eq!(
        source.manifest_requests(),
        vec![format!("{STORAGE}/releases_macos.json"); 2]
    );
}
