//! Process-wide active cache root.
//!
//! Every [`CacheEntry`](super::CacheEntry) built without an explicit
//! [`CacheDir`](super::CacheDir) resolves against the root held here at the
//! moment of construction. The root starts out as
//! [`resolve_cache_dir`](super::resolve_cache_dir) and changes only through
//! [`set_root`].

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use super::config::resolve_cache_dir;
use crate::error::Result;
use crate::fs::ensure_dir_exists;
use crate::observability::REGISTRY_TARGET;

static ACTIVE_ROOT: RwLock<Option<Utf8PathBuf>> = RwLock::new(None);

/// Returns the active cache root without side effects on disk.
///
/// The first call in a process fixes the default root if none was set.
#[must_use]
pub fn current_root() -> Utf8PathBuf {
    if let Some(root) = ACTIVE_ROOT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return root.clone();
    }

    let mut guard = ACTIVE_ROOT.write().unwrap_or_else(PoisonError::into_inner);
    guard.get_or_insert_with(resolve_cache_dir).clone()
}

/// Swaps the active cache root, returning the previous one.
///
/// With `create_if_missing` the new root is created (recursively) before the
/// swap, so a creation failure leaves the previous root active.
///
/// # Errors
///
/// Returns [`CacheError::Io`](crate::CacheError::Io) when the new root cannot be created.
///
/// # Examples
/// ```no_run
/// use cachedir_manager::{current_root, set_root};
///
/// let previous = set_root("/tmp/my-cache".into(), true)?;
/// assert_eq!(current_root(), "/tmp/my-cache");
/// set_root(previous, false)?;
/// # Ok::<(), cachedir_manager::CacheError>(())
/// ```
pub fn set_root(new_root: Utf8PathBuf, create_if_missing: bool) -> Result<Utf8PathBuf> {
    if create_if_missing {
        ensure_dir_exists(&new_root)?;
    }

    let mut guard = ACTIVE_ROOT.write().unwrap_or_else(PoisonError::into_inner);
    let previous = guard
        .replace(new_root.clone())
        .unwrap_or_else(resolve_cache_dir);
    drop(guard);

    log_swap(&previous, &new_root);
    Ok(previous)
}

fn log_swap(previous: &Utf8Path, new_root: &Utf8Path) {
    debug!(
        target: REGISTRY_TARGET,
        previous = %previous,
        root = %new_root,
        "cache root changed"
    );
}
