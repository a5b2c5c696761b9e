//! Tests for cache entry lifecycle.

use super::*;
use std::io::{Read, Write};
use tempfile::tempdir;

fn scratch_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
    (temp, root)
}

#[test]
fn construction_creates_containing_directory() {
    let (_temp, root) = scratch_root();
    let key = CacheKey::new(["TEST", "Test county", "test name.csv"]).expect("key");

    let entry = CacheEntry::with_root(key, &root).expect("entry");

    assert!(entry.directory().is_dir());
    assert!(entry.directory().ends_with("cache/0/TEST/Test_county"));
    assert!(!entry.exists());
}

#[test]
fn construction_tolerates_existing_directory() {
    let (_temp, root) = scratch_root();
    let key = CacheKey::new(["a", "b.txt"]).expect("key");

    CacheEntry::with_root(key.clone(), &root).expect("first entry");
    CacheEntry::with_root(key, &root).expect("second entry");
}

#[test]
fn write_then_delete_toggles_existence() {
    let (_temp, root) = scratch_root();
    let entry = CacheEntry::with_root(CacheKey::file("f.csv").expect("key"), &root).expect("entry");

    {
        let mut file = entry.open(OpenMode::Write).expect("open for write");
        file.write_all(b"a,b\n1,2\n").expect("write");
    }
    assert!(entry.exists());

    entry.delete(true).expect("delete");
    assert!(!entry.exists());
}

#[test]
fn delete_twice_is_silent_when_ignoring_missing() {
    let (_temp, root) = scratch_root();
    let entry = CacheEntry::with_root(CacheKey::file("f.csv").expect("key"), &root).expect("entry");
    entry.write("x").expect("write");

    entry.delete(true).expect("first delete");
    entry.delete(true).expect("second delete");
}

#[test]
fn strict_delete_of_missing_file_reports_not_found() {
    let (_temp, root) = scratch_root();
    let entry = CacheEntry::with_root(CacheKey::file("f.csv").expect("key"), &root).expect("entry");

    let err = entry.delete(false).expect_err("missing file");
    assert!(matches!(err, CacheError::NotFound { .. }));
}

#[test]
fn open_read_on_missing_file_is_io_error() {
    let (_temp, root) = scratch_root();
    let entry = CacheEntry::with_root(CacheKey::file("f.csv").expect("key"), &root).expect("entry");

    let err = entry.open(OpenMode::Read).expect_err("missing file");
    assert!(matches!(err, CacheError::Io { .. }));
}

#[test]
fn append_extends_existing_content() {
    let (_temp, root) = scratch_root();
    let entry = CacheEntry::with_root(CacheKey::file("log.txt").expect("key"), &root).expect("entry");
    entry.write("one\n").expect("write");

    {
        let mut file = entry.open(OpenMode::Append).expect("open for append");
        file.write_all(b"two\n").expect("append");
    }

    let mut contents = String::new();
    entry
        .open(OpenMode::Read)
        .expect("open for read")
        .read_to_string(&mut contents)
        .expect("read");
    assert_eq!(contents, "one\ntwo\n");
}

#[test]
fn size_reports_byte_length() {
    let (_temp, root) = scratch_root();
    let entry = CacheEntry::with_root(CacheKey::file("f.bin").expect("key"), &root).expect("entry");
    entry.write(vec![0_u8; 500]).expect("write");

    assert_eq!(entry.size().expect("size"), 500);
}

#[test]
fn display_renders_full_path() {
    let (_temp, root) = scratch_root();
    let key = CacheKey::file("f.csv")
        .expect("key")
        .package("p")
        .expect("package")
        .version(2)
        .expect("version");
    let entry = CacheEntry::with_root(key, &root).expect("entry");

    assert_eq!(entry.to_string(), root.join("p/2/f.csv").as_str());
}
