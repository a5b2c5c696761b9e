//! Scratch cache roots for tests and doctests.

use camino::Utf8PathBuf;
use tempfile::TempDir;

use crate::cache::CacheDir;

/// Temporary cache root removed when dropped.
#[derive(Debug)]
pub struct ScratchCache {
    _temp: TempDir,
    cache: CacheDir,
}

impl ScratchCache {
    /// Creates an empty cache root in a fresh temporary directory.
    ///
    /// # Panics
    ///
    /// Panics when the temporary directory cannot be created or is not UTF-8.
    #[must_use]
    #[expect(
        clippy::expect_used,
        reason = "test fixture; failing loudly is the desired behaviour"
    )]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create scratch cache directory");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("cache"))
            .expect("scratch cache path should be UTF-8");
        std::fs::create_dir_all(&root).expect("create scratch cache root");
        Self {
            _temp: temp,
            cache: CacheDir::new(root),
        }
    }

    /// The cache rooted in the scratch directory.
    #[must_use]
    pub const fn cache(&self) -> &CacheDir {
        &self.cache
    }

    /// Path of the scratch cache root.
    #[must_use]
    pub fn root(&self) -> Utf8PathBuf {
        self.cache.root().to_path_buf()
    }

    /// A sibling path outside the cache root, suitable for archive files.
    #[must_use]
    pub fn outside(&self, name: &str) -> Utf8PathBuf {
        self.cache
            .root()
            .parent()
            .map_or_else(|| Utf8PathBuf::from(name), |parent| parent.join(name))
    }
}

impl Default for ScratchCache {
    fn default() -> Self {
        Self::new()
    }
}
