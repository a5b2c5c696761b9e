//! A single cache file resolved beneath a cache root.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use tracing::debug;

use super::key::CacheKey;
use super::registry::current_root;
use super::resolver::{ResolvedPath, resolve};
use crate::error::{CacheError, Result};
use crate::fs::ensure_dir_exists;
use crate::observability::ENTRY_TARGET;

/// How [`CacheEntry::open`] opens the underlying file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Open an existing file for reading.
    #[default]
    Read,
    /// Create or truncate the file for writing.
    Write,
    /// Create the file if needed and append to it.
    Append,
    /// Open an existing file for reading and writing without truncation.
    ReadWrite,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Read => options.read(true),
            Self::Write => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::ReadWrite => options.read(true).write(true),
        };
        options
    }
}

/// Handle on one cache file.
///
/// Construction creates the containing directory so callers can write to the
/// entry straight away.
///
/// # Examples
/// ```no_run
/// use std::io::Write;
/// use cachedir_manager::{CacheEntry, CacheKey, OpenMode};
///
/// let entry = CacheEntry::new(CacheKey::new(["ST", "County", "file.csv"])?)?;
/// if !entry.exists() {
///     let mut file = entry.open(OpenMode::Write)?;
///     writeln!(file, "test").map_err(|err| cachedir_manager::CacheError::io("write", err))?;
/// }
/// # Ok::<(), cachedir_manager::CacheError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CacheEntry {
    key: CacheKey,
    resolved: ResolvedPath,
}

impl CacheEntry {
    /// Resolves `key` against the active cache root and creates its directory.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the containing directory cannot be created.
    pub fn new(key: CacheKey) -> Result<Self> {
        Self::with_root(key, &current_root())
    }

    /// Resolves `key` against an explicit cache root and creates its directory.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the containing directory cannot be created.
    pub fn with_root(key: CacheKey, cache_root: &Utf8Path) -> Result<Self> {
        let resolved = resolve(&key, cache_root);
        debug!(
            target: ENTRY_TARGET,
            package = ?key.package_name(),
            version = %key.schema_version(),
            segments = ?key.segments(),
            path = %resolved.full_path,
            "resolved cache entry"
        );
        ensure_dir_exists(&resolved.directory)?;
        Ok(Self { key, resolved })
    }

    /// Returns the key this entry was built from.
    #[must_use]
    pub const fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Full path of the cache file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.resolved.full_path
    }

    /// Directory holding the cache file.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.resolved.directory
    }

    /// Package/version root the entry lives under.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.resolved.root
    }

    /// Reports whether anything exists at the entry's path.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.resolved.full_path.exists()
    }

    /// Opens the cache file. The handle closes when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] for the same reasons the underlying open
    /// would fail, such as a missing file in [`OpenMode::Read`].
    pub fn open(&self, mode: OpenMode) -> Result<File> {
        mode.options()
            .open(self.path())
            .map_err(|err| CacheError::io(format!("open {}", self.path()), err))
    }

    /// Reads the whole cache file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the file is missing, unreadable, or not UTF-8.
    pub fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(self.path())
            .map_err(|err| CacheError::io(format!("read {}", self.path()), err))
    }

    /// Replaces the cache file contents.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] when the file cannot be written.
    pub fn write(&self, contents: impl AsRef<[u8]>) -> Result<()> {
        fs::write(self.path(), contents)
            .map_err(|err| CacheError::io(format!("write {}", self.path()), err))
    }

    /// Size of the cache file in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] when the file is missing and
    /// [`CacheError::Io`] for other metadata failures.
    pub fn size(&self) -> Result<u64> {
        match fs::metadata(self.path()) {
            Ok(metadata) => Ok(metadata.len()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(CacheError::NotFound {
                path: self.resolved.full_path.clone(),
            }),
            Err(err) => Err(CacheError::io(format!("stat {}", self.path()), err)),
        }
    }

    /// Deletes the cache file.
    ///
    /// A missing file is a no-op when `ignore_missing` is set.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] for a missing file when
    /// `ignore_missing` is false, and [`CacheError::Io`] for other failures.
    pub fn delete(&self, ignore_missing: bool) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => {
                debug!(target: ENTRY_TARGET, path = %self.path(), "deleted cache file");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if !ignore_missing {
                    return Err(CacheError::NotFound {
                        path: self.resolved.full_path.clone(),
                    });
                }
                debug!(
                    target: ENTRY_TARGET,
                    path = %self.path(),
                    "cache file already absent"
                );
                Ok(())
            }
            Err(err) => Err(CacheError::io(format!("delete {}", self.path()), err)),
        }
    }

    /// Consumes the entry, returning its full path.
    #[must_use]
    pub fn into_path(self) -> Utf8PathBuf {
        self.resolved.full_path
    }
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolved.full_path.as_str())
    }
}

#[cfg(test)]
mod tests;
