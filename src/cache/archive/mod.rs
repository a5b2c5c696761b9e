//! Whole-root backup and restore through a pluggable tar archiver.
//!
//! Archives always cover the entire cache root. Compression is chosen solely by
//! a `.gz` suffix on the archive file name, on both the backup and the restore
//! side.

mod command;
mod native;

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use tracing::debug;

pub use command::TarCommand;
pub use native::NativeTar;

use crate::error::{CacheError, Result};
use crate::fs::{ensure_dir_exists, utf8_path};
use crate::observability::ARCHIVE_TARGET;

/// Packs a directory into a tar archive and unpacks it again.
pub trait Archiver: fmt::Debug {
    /// Writes the contents of `src_dir` to `dest_file`, gzip-filtered when `compressed`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ExternalTool`] or [`CacheError::Io`] depending on
    /// where the archiver runs.
    fn pack(&self, src_dir: &Utf8Path, dest_file: &Utf8Path, compressed: bool) -> Result<()>;

    /// Extracts `src_file` into `dest_dir`, gunzipping first when `compressed`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ExternalTool`] or [`CacheError::Io`] depending on
    /// where the archiver runs.
    fn unpack(&self, src_file: &Utf8Path, dest_dir: &Utf8Path, compressed: bool) -> Result<()>;
}

/// Reports whether an archive file name selects gzip compression.
#[must_use]
pub fn is_compressed(file: &Utf8Path) -> bool {
    file.as_str().ends_with(".gz")
}

/// Archives the whole of `cache_root` into `destination`.
///
/// # Errors
///
/// Returns [`CacheError::InvalidArgument`] when `destination` lies inside the
/// cache root, and propagates archiver failures.
pub fn backup(cache_root: &Utf8Path, destination: &Utf8Path, archiver: &dyn Archiver) -> Result<()> {
    let root = absolute(cache_root)?;
    let dest = absolute(destination)?;
    if dest.starts_with(&root) {
        return Err(CacheError::invalid(format!(
            "backup file {dest} must be outside the cache root {root}"
        )));
    }
    ensure_dir_exists(&root)?;

    let compressed = is_compressed(&dest);
    log_start("backup", &root, &dest, compressed);
    archiver.pack(&root, &dest, compressed)?;
    log_complete("backup", &dest);
    Ok(())
}

/// Extracts `source` into `cache_root`, creating the root when needed.
///
/// Existing files with the same names are overwritten; other files are kept.
///
/// # Errors
///
/// Returns [`CacheError::NotFound`] when `source` is missing and propagates
/// archiver failures.
pub fn restore(cache_root: &Utf8Path, source: &Utf8Path, archiver: &dyn Archiver) -> Result<()> {
    let root = absolute(cache_root)?;
    let src = absolute(source)?;
    if !src.is_file() {
        return Err(CacheError::NotFound { path: src });
    }
    ensure_dir_exists(&root)?;

    let compressed = is_compressed(&src);
    log_start("restore", &root, &src, compressed);
    archiver.unpack(&src, &root, compressed)?;
    log_complete("restore", &src);
    Ok(())
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let resolved = std::path::absolute(path)
        .map_err(|err| CacheError::io(format!("resolve {path}"), err))?;
    utf8_path(&resolved)
}

fn log_start(operation: &str, root: &Utf8Path, file: &Utf8Path, compressed: bool) {
    debug!(
        target: ARCHIVE_TARGET,
        operation,
        root = %root,
        file = %file,
        compressed,
        "archive operation started"
    );
}

fn log_complete(operation: &str, file: &Utf8Path) {
    debug!(
        target: ARCHIVE_TARGET,
        operation,
        file = %file,
        "archive operation completed"
    );
}
