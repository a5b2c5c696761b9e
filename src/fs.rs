//! Shared filesystem helpers used by cache entries and tree maintenance.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use std::io::{self, ErrorKind};
use std::path::Path;

use crate::error::{CacheError, Result};

/// Resolves a path to an ambient directory handle paired with the relative path component.
///
/// Absolute paths are opened relative to the ambient root; relative paths reuse the current
/// working directory.
pub(crate) fn ambient_dir_and_path(path: &Utf8Path) -> Result<(Dir, Utf8PathBuf)> {
    if path.has_root() {
        let stripped = path
            .strip_prefix("/")
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());
        let dir = Dir::open_ambient_dir("/", ambient_authority())
            .map_err(|err| CacheError::io("open ambient root directory", err))?;
        Ok((dir, stripped))
    } else {
        let dir = Dir::open_ambient_dir(".", ambient_authority())
            .map_err(|err| CacheError::io("open ambient working directory", err))?;
        Ok((dir, path.to_path_buf()))
    }
}

/// Ensures the provided path exists, creating intermediate directories when required.
///
/// Succeeds without touching the filesystem when the directory is already present.
pub(crate) fn ensure_dir_exists(path: &Utf8Path) -> Result<()> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }

    dir.create_dir_all(relative.as_std_path())
        .or_else(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                Ok(())
            } else {
                Err(err)
            }
        })
        .map_err(|err| CacheError::io(format!("create {path}"), err))
}

/// Grants the owner write access to `path`, leaving other permission bits alone.
pub(crate) fn make_owner_writable(path: &Path) -> io::Result<()> {
    let metadata = std::fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }
    let mut permissions = metadata.permissions();
    set_owner_write(&mut permissions);
    std::fs::set_permissions(path, permissions)
}

#[cfg(unix)]
fn set_owner_write(permissions: &mut std::fs::Permissions) {
    use std::os::unix::fs::PermissionsExt;

    permissions.set_mode(permissions.mode() | 0o200);
}

#[cfg(not(unix))]
#[expect(
    clippy::permissions_set_readonly_false,
    reason = "clearing the read-only attribute is the intent on non-Unix platforms"
)]
fn set_owner_write(permissions: &mut std::fs::Permissions) {
    permissions.set_readonly(false);
}

/// Converts a standard path into a UTF-8 path, rejecting non-UTF-8 input.
pub(crate) fn utf8_path(path: &Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|rejected| {
        CacheError::invalid(format!("{} is not valid UTF-8", rejected.display()))
    })
}
