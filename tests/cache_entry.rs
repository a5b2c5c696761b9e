//! Behaviour of cache entries resolved against the process-wide root.

use std::io::Write;

use cachedir_manager::test_support::{ScratchCache, capture_debug_logs};
use cachedir_manager::{CacheEntry, CacheError, CacheKey, OpenMode, set_root};
use rstest::{fixture, rstest};
use serial_test::serial;

/// Points the registry at a fresh scratch root for the duration of a test.
struct ActiveScratch {
    scratch: ScratchCache,
    previous: camino::Utf8PathBuf,
}

impl Drop for ActiveScratch {
    fn drop(&mut self) {
        drop(set_root(self.previous.clone(), false));
    }
}

#[fixture]
fn active() -> ActiveScratch {
    let scratch = ScratchCache::new();
    let previous = set_root(scratch.root(), true).expect("activate scratch root");
    ActiveScratch { scratch, previous }
}

#[rstest]
#[serial]
fn written_entry_exists_until_deleted(active: ActiveScratch) {
    let key = CacheKey::new(["ST", "County", "file.csv"]).expect("key");
    let entry = CacheEntry::new(key).expect("entry");

    let mut file = entry.open(OpenMode::Write).expect("open");
    file.write_all(b"test\n1\n").expect("write");
    drop(file);

    assert!(entry.exists());
    assert!(entry.path().starts_with(active.scratch.root()));

    entry.delete(true).expect("delete");
    assert!(!entry.exists());
}

#[rstest]
#[serial]
fn unpackaged_entry_resolves_directly_under_root(active: ActiveScratch) {
    let key = CacheKey::file("f.csv").expect("key").no_package();
    let entry = CacheEntry::new(key).expect("entry");

    assert_eq!(entry.path(), active.scratch.root().join("f.csv"));
}

#[rstest]
#[case(2_i64.into(), "p/2/f.csv")]
#[case("v1".into(), "p/v1/f.csv")]
#[case(cachedir_manager::Version::try_from(1.5).expect("finite"), "p/1.5/f.csv")]
#[serial]
fn packaged_entry_resolves_under_package_and_version(
    active: ActiveScratch,
    #[case] version: cachedir_manager::Version,
    #[case] relative: &str,
) {
    let key = CacheKey::file("f.csv")
        .expect("key")
        .package("p")
        .expect("package")
        .version(version)
        .expect("version");
    let entry = CacheEntry::new(key).expect("entry");

    assert_eq!(entry.path(), active.scratch.root().join(relative));
}

#[rstest]
#[serial]
fn segment_spaces_become_underscores_on_disk(active: ActiveScratch) {
    let key = CacheKey::new(["CA", "Santa Clara", "data.csv"]).expect("key");
    let entry = CacheEntry::new(key).expect("entry");

    let expected = active.scratch.root().join("cache/0/CA/Santa_Clara");
    assert_eq!(entry.directory(), expected);
    assert!(expected.is_dir());
}

#[rstest]
#[serial]
fn deleting_missing_file_logs_at_debug_only(_active: ActiveScratch) {
    let entry = CacheEntry::new(CacheKey::file("gone.csv").expect("key")).expect("entry");

    let (logs, result) = capture_debug_logs(|| entry.delete(true));

    result.expect("ignored missing file");
    assert!(logs.iter().any(|line| line.contains("already absent")));
    assert!(logs.iter().all(|line| !line.contains("WARN")));
}

#[rstest]
#[serial]
fn strict_delete_surfaces_not_found(_active: ActiveScratch) {
    let entry = CacheEntry::new(CacheKey::file("gone.csv").expect("key")).expect("entry");

    let err = entry.delete(false).expect_err("strict delete");
    assert!(matches!(err, CacheError::NotFound { .. }));
}
