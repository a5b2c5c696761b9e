//! Cache key resolution, entries, and whole-tree maintenance.
//!
//! A cache file is addressed by a [`CacheKey`]: an optional package namespace,
//! a schema [`Version`], and one or more path segments ending in the file's
//! `name.ext`. Keys resolve beneath a cache root as
//!
//! ```text
//! <root>/<package>/<version>/<segment>/.../<name.ext>
//! ```
//!
//! collapsing to `<root>/<segment>/.../<name.ext>` without a package.
//!
//! # Cache Root
//!
//! The process-wide root lives in the registry ([`current_root`],
//! [`set_root`]) and defaults to [`resolve_cache_dir`]. Code that prefers an
//! explicit value threads a [`CacheDir`] instead.
//!
//! # Concurrency
//!
//! Nothing here coordinates between processes. Concurrent clears and writes
//! against overlapping paths race.

mod archive;
mod config;
mod entry;
mod key;
mod registry;
mod resolver;
mod tree;

use camino::{Utf8Path, Utf8PathBuf};

pub use archive::{Archiver, NativeTar, TarCommand, backup, is_compressed, restore};
pub use config::{CACHE_DIR_ENV, resolve_cache_dir};
pub use entry::{CacheEntry, OpenMode};
pub use key::{CacheKey, DEFAULT_PACKAGE, Version, normalise_segments};
pub use registry::{current_root, set_root};
pub use resolver::{ResolvedPath, resolve};
pub use tree::{
    ClearFailure, ClearReport, clear_tree, display_path, file_size, format_size, path_size,
    tree_size,
};

use crate::error::Result;

/// A cache root passed around explicitly instead of read from the registry.
///
/// # Examples
/// ```
/// use cachedir_manager::{CacheDir, CacheKey};
///
/// let temp = tempfile::tempdir()?;
/// let cache = CacheDir::new(camino::Utf8Path::from_path(temp.path()).unwrap());
/// let entry = cache.entry(CacheKey::file("f.csv")?)?;
/// entry.write("x")?;
/// assert_eq!(cache.tree_size::<&str>(&[])?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    root: Utf8PathBuf,
}

impl CacheDir {
    /// Wraps an explicit cache root.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Snapshots the registry's active root.
    #[must_use]
    pub fn current() -> Self {
        Self::new(current_root())
    }

    /// The cache root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resolves `key` beneath this root, creating its directory.
    ///
    /// # Errors
    ///
    /// See [`CacheEntry::with_root`].
    pub fn entry(&self, key: CacheKey) -> Result<CacheEntry> {
        CacheEntry::with_root(key, &self.root)
    }

    /// Clears `segments` beneath this root.
    ///
    /// # Errors
    ///
    /// See [`clear_tree`].
    pub fn clear<S: AsRef<str>>(&self, segments: &[S], clear_read_only: bool) -> Result<ClearReport> {
        clear_tree(&self.root, segments, clear_read_only)
    }

    /// Size of the single file at `segments`.
    ///
    /// # Errors
    ///
    /// See [`file_size`].
    pub fn file_size<S: AsRef<str>>(&self, segments: &[S]) -> Result<u64> {
        file_size(&self.root, segments)
    }

    /// Total size of everything beneath `segments`.
    ///
    /// # Errors
    ///
    /// See [`tree_size`].
    pub fn tree_size<S: AsRef<str>>(&self, segments: &[S]) -> Result<u64> {
        tree_size(&self.root, segments)
    }

    /// Archives the whole root into `destination`.
    ///
    /// # Errors
    ///
    /// See [`backup`].
    pub fn backup(&self, destination: &Utf8Path, archiver: &dyn Archiver) -> Result<()> {
        backup(&self.root, destination, archiver)
    }

    /// Extracts `source` into the root.
    ///
    /// # Errors
    ///
    /// See [`restore`].
    pub fn restore(&self, source: &Utf8Path, archiver: &dyn Archiver) -> Result<()> {
        restore(&self.root, source, archiver)
    }
}
