//! Maps logical cache keys onto files under a local cache root and maintains
//! the resulting tree.
//!
//! A key names a package, a schema version, and a path ending in the file's
//! `name.ext`. The library resolves it to
//! `<root>/<package>/<version>/<path...>`, creates the containing directory,
//! and hands back a [`CacheEntry`] that can be checked, opened, or deleted.
//! Whole-subtree maintenance covers best-effort clearing, disk usage, and
//! tar-based backup and restore of the entire root.
//!
//! # Examples
//! ```
//! use cachedir_manager::{CacheDir, CacheKey};
//!
//! let temp = tempfile::tempdir()?;
//! let cache = CacheDir::new(camino::Utf8Path::from_path(temp.path()).unwrap());
//!
//! let entry = cache.entry(CacheKey::new(["CA", "Santa Clara", "data.csv"])?)?;
//! if !entry.exists() {
//!     entry.write("a,b\n1,2\n")?;
//! }
//! assert!(entry.path().ends_with("cache/0/CA/Santa_Clara/data.csv"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod cli;
mod error;
mod fs;
mod observability;
mod settings;
#[doc(hidden)]
pub mod test_support;

pub use cache::{
    Archiver, CacheDir, CacheEntry, CacheKey, ClearFailure, ClearReport, NativeTar, OpenMode,
    ResolvedPath, TarCommand, Version, backup, clear_tree, current_root, display_path, file_size,
    format_size, is_compressed, path_size, resolve, resolve_cache_dir, restore, set_root,
    tree_size,
};
pub use error::{CacheError, ConfigError, ConfigResult, EXIT_FAILED, Result};
pub use settings::{ArchiverKind, CacheEnvCfg};
