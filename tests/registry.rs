//! Swapping the process-wide cache root.

use cachedir_manager::test_support::ScratchCache;
use cachedir_manager::{CacheDir, CacheEntry, CacheKey, current_root, set_root};
use rstest::rstest;
use serial_test::serial;

#[rstest]
#[serial]
fn set_root_returns_previous_and_redirects_entries() {
    let first = ScratchCache::new();
    let second = ScratchCache::new();
    let original = set_root(first.root(), true).expect("set first root");

    let previous = set_root(second.root(), true).expect("set second root");
    assert_eq!(previous, first.root());
    assert_eq!(current_root(), second.root());

    let entry = CacheEntry::new(CacheKey::file("f.csv").expect("key")).expect("entry");
    assert!(entry.path().starts_with(second.root()));
    assert!(!entry.path().starts_with(first.root()));

    set_root(original, false).expect("restore original root");
}

#[rstest]
#[serial]
fn set_root_creates_missing_directory() {
    let scratch = ScratchCache::new();
    let nested = scratch.root().join("deeper/still");
    let original = set_root(nested.clone(), true).expect("set nested root");

    assert!(nested.is_dir());

    set_root(original, false).expect("restore original root");
}

#[rstest]
#[serial]
fn set_root_without_creation_leaves_disk_alone() {
    let scratch = ScratchCache::new();
    let absent = scratch.root().join("absent");
    let original = set_root(absent.clone(), false).expect("set absent root");

    assert!(!absent.exists());
    assert_eq!(CacheDir::current().root(), absent);

    set_root(original, false).expect("restore original root");
}

#[rstest]
#[serial]
fn current_root_has_no_side_effects() {
    let scratch = ScratchCache::new();
    let absent = scratch.root().join("never-created");
    let original = set_root(absent.clone(), false).expect("set absent root");

    let root = current_root();
    assert_eq!(root, absent);
    assert!(!absent.exists());

    set_root(original, false).expect("restore original root");
}
