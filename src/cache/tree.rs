//! Whole-subtree maintenance: best-effort clearing and disk usage.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::key::normalise_segments;
use crate::error::{CacheError, Result};
use crate::fs::make_owner_writable;
use crate::observability::TREE_TARGET;

/// A filesystem entry `clear` could not remove.
#[derive(Debug)]
pub struct ClearFailure {
    /// Path that survived the clear.
    pub path: PathBuf,
    /// Error from the final removal attempt.
    pub error: io::Error,
}

/// Outcome of a best-effort clear.
#[derive(Debug, Default)]
pub struct ClearReport {
    /// Number of files and directories removed.
    pub removed: usize,
    /// Entries left behind, with the error that stopped each one.
    pub failures: Vec<ClearFailure>,
}

impl ClearReport {
    /// Reports whether every entry under the target was removed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Recursively deletes the tree at `cache_root/segments...`.
///
/// An empty `segments` clears the contents of `cache_root` but keeps the root
/// directory itself. A missing target is a no-op. With `clear_read_only`, an
/// entry refused with `PermissionDenied` is made owner-writable (along with
/// its parent directory) and removal is retried once. Entries that still
/// resist are collected in the report rather than aborting the walk.
///
/// # Errors
///
/// Returns [`CacheError::InvalidArgument`] for unsafe segments and
/// [`CacheError::Io`] when the target itself cannot be inspected.
///
/// # Examples
/// ```
/// use cachedir_manager::clear_tree;
///
/// let temp = tempfile::tempdir()?;
/// let root = camino::Utf8Path::from_path(temp.path()).unwrap();
/// std::fs::create_dir_all(root.join("CA/Alameda"))?;
/// std::fs::write(root.join("CA/Alameda/data.csv"), "x")?;
///
/// let report = clear_tree(root, &["CA"], true)?;
/// assert!(report.is_complete());
/// assert!(!root.join("CA").exists());
/// assert!(root.exists());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn clear_tree<S: AsRef<str>>(
    cache_root: &Utf8Path,
    segments: &[S],
    clear_read_only: bool,
) -> Result<ClearReport> {
    let target = join_segments(cache_root, segments)?;
    let mut report = ClearReport::default();

    let metadata = match fs::symlink_metadata(&target) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(target: TREE_TARGET, path = %target, "nothing to clear");
            return Ok(report);
        }
        Err(err) => return Err(CacheError::io(format!("inspect {target}"), err)),
    };

    let walker = Walker { clear_read_only };
    if segments.is_empty() {
        walker.clear_children(target.as_std_path(), &mut report);
    } else if metadata.is_dir() {
        walker.clear_children(target.as_std_path(), &mut report);
        walker.remove(target.as_std_path(), EntryKind::Dir, &mut report);
    } else {
        walker.remove(target.as_std_path(), EntryKind::File, &mut report);
    }

    log_clear_complete(&target, &report);
    Ok(report)
}

#[derive(Clone, Copy)]
enum EntryKind {
    File,
    Dir,
}

struct Walker {
    clear_read_only: bool,
}

impl Walker {
    fn clear_children(&self, dir: &Path, report: &mut ClearReport) {
        let entries = match self.read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                record_failure(report, dir, error);
                return;
            }
        };

        for dir_entry in entries {
            let entry = match dir_entry {
                Ok(entry) => entry,
                Err(error) => {
                    record_failure(report, dir, error);
                    continue;
                }
            };
            let path = entry.path();
            let is_dir = entry.file_type().is_ok_and(|file_type| file_type.is_dir());
            if is_dir {
                self.clear_children(&path, report);
                self.remove(&path, EntryKind::Dir, report);
            } else {
                self.remove(&path, EntryKind::File, report);
            }
        }
    }

    fn read_dir(&self, dir: &Path) -> io::Result<fs::ReadDir> {
        match fs::read_dir(dir) {
            Err(err) if self.clear_read_only && err.kind() == ErrorKind::PermissionDenied => {
                make_owner_accessible(dir)?;
                fs::read_dir(dir)
            }
            other => other,
        }
    }

    fn remove(&self, path: &Path, kind: EntryKind, report: &mut ClearReport) {
        match remove_once(path, kind) {
            Ok(()) => report.removed += 1,
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) if self.clear_read_only && err.kind() == ErrorKind::PermissionDenied => {
                self.retry_read_only(path, kind, report);
            }
            Err(err) => record_failure(report, path, err),
        }
    }

    fn retry_read_only(&self, path: &Path, kind: EntryKind, report: &mut ClearReport) {
        let prepared = make_owner_writable(path).and_then(|()| {
            path.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or(Ok(()), make_owner_writable)
        });
        if let Err(err) = prepared {
            record_failure(report, path, err);
            return;
        }

        match remove_once(path, kind) {
            Ok(()) => {
                report.removed += 1;
                debug!(
                    target: TREE_TARGET,
                    path = %path.display(),
                    "cleared read-only entry"
                );
            }
            Err(err) => record_failure(report, path, err),
        }
    }
}

fn remove_once(path: &Path, kind: EntryKind) -> io::Result<()> {
    match kind {
        EntryKind::File => fs::remove_file(path),
        EntryKind::Dir => fs::remove_dir(path),
    }
}

#[cfg(unix)]
fn make_owner_accessible(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(dir)?.permissions();
    permissions.set_mode(permissions.mode() | 0o700);
    fs::set_permissions(dir, permissions)
}

#[cfg(not(unix))]
fn make_owner_accessible(dir: &Path) -> io::Result<()> {
    make_owner_writable(dir)
}

fn record_failure(report: &mut ClearReport, path: &Path, error: io::Error) {
    warn!(
        target: TREE_TARGET,
        path = %path.display(),
        error = %error,
        "failed to clear cache entry"
    );
    report.failures.push(ClearFailure {
        path: path.to_path_buf(),
        error,
    });
}

fn log_clear_complete(target: &Utf8Path, report: &ClearReport) {
    debug!(
        target: TREE_TARGET,
        path = %target,
        removed = report.removed,
        failures = report.failures.len(),
        "cleared cache tree"
    );
}

/// Size in bytes of the single file at `cache_root/segments...`.
///
/// # Errors
///
/// Returns [`CacheError::NotFound`] when nothing exists there,
/// [`CacheError::InvalidArgument`] when the target is a directory or a segment
/// is unsafe, and [`CacheError::Io`] for other metadata failures.
pub fn file_size<S: AsRef<str>>(cache_root: &Utf8Path, segments: &[S]) -> Result<u64> {
    let target = join_segments(cache_root, segments)?;
    let metadata = stat(&target)?;
    if metadata.is_dir() {
        return Err(CacheError::invalid(format!("{target} is a directory")));
    }
    Ok(metadata.len())
}

/// Total size in bytes of every file beneath `cache_root/segments...`.
///
/// Symbolic links are counted by their own size and never followed. A plain
/// file target reports its own length.
///
/// # Errors
///
/// Returns [`CacheError::NotFound`] when the target is missing and
/// [`CacheError::Io`] when part of the tree cannot be read.
pub fn tree_size<S: AsRef<str>>(cache_root: &Utf8Path, segments: &[S]) -> Result<u64> {
    let target = join_segments(cache_root, segments)?;
    path_size(&target)
}

/// Total size in bytes of the file or directory tree at `path`.
///
/// # Errors
///
/// Returns [`CacheError::NotFound`] when `path` is missing and
/// [`CacheError::Io`] when part of the tree cannot be read.
pub fn path_size(path: &Utf8Path) -> Result<u64> {
    stat(path)?;
    sum_tree(path.as_std_path()).map_err(|err| CacheError::io(format!("measure {path}"), err))
}

fn sum_tree(path: &Path) -> io::Result<u64> {
    let metadata = fs::symlink_metadata(path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }
    fs::read_dir(path)?.try_fold(0_u64, |total, dir_entry| {
        let size = sum_tree(&dir_entry?.path())?;
        Ok(total.saturating_add(size))
    })
}

fn stat(target: &Utf8Path) -> Result<fs::Metadata> {
    fs::symlink_metadata(target).map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            CacheError::NotFound {
                path: target.to_path_buf(),
            }
        } else {
            CacheError::io(format!("stat {target}"), err)
        }
    })
}

fn join_segments<S: AsRef<str>>(cache_root: &Utf8Path, segments: &[S]) -> Result<Utf8PathBuf> {
    let normalised = normalise_segments(segments)?;
    Ok(normalised
        .iter()
        .fold(cache_root.to_path_buf(), |path, segment| path.join(segment)))
}

/// Formats a byte count with decimal (1000-based) magnitudes.
///
/// # Examples
/// ```
/// use cachedir_manager::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(2_500_000), "2.500 MB");
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "display rounding to three decimals tolerates f64 precision"
)]
pub fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1e3 {
        format!("{size:.0} B")
    } else if size < 1e6 {
        format!("{:.3} kB", size / 1e3)
    } else if size < 1e9 {
        format!("{:.3} MB", size / 1e6)
    } else if size < 1e12 {
        format!("{:.3} GB", size / 1e9)
    } else {
        format!("{:.3} TB", size / 1e12)
    }
}

/// Renders `path` with the `cache_root` prefix abbreviated to `~`.
///
/// Paths outside the root are returned unchanged.
#[must_use]
pub fn display_path(cache_root: &Utf8Path, path: &Utf8Path) -> String {
    match path.strip_prefix(cache_root) {
        Ok(relative) if relative.as_str().is_empty() => "~".to_owned(),
        Ok(relative) => format!("~/{relative}"),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0 B")]
    #[case(500, "500 B")]
    #[case(999, "999 B")]
    #[case(1_000, "1.000 kB")]
    #[case(12_345, "12.345 kB")]
    #[case(2_500_000, "2.500 MB")]
    #[case(3_000_000_000, "3.000 GB")]
    #[case(4_200_000_000_000, "4.200 TB")]
    fn format_size_uses_decimal_thresholds(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_size(bytes), expected);
    }

    #[rstest]
    #[case("/cache/p/0/f.csv", "~/p/0/f.csv")]
    #[case("/cache", "~")]
    #[case("/elsewhere/f.csv", "/elsewhere/f.csv")]
    fn display_path_abbreviates_root(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(
            display_path(Utf8Path::new("/cache"), Utf8Path::new(path)),
            expected
        );
    }

    #[test]
    fn join_segments_rejects_parent_traversal() {
        let err = join_segments(Utf8Path::new("/cache"), &[".."]).expect_err("traversal");
        assert!(matches!(err, CacheError::InvalidArgument(_)));
    }
}
