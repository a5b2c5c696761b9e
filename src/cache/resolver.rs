//! Pure path arithmetic turning a [`CacheKey`] into on-disk locations.

use camino::{Utf8Path, Utf8PathBuf};

use super::key::CacheKey;

/// Locations derived from a key and a cache root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `cache_root/package/version`, or `cache_root` when the key has no package.
    pub root: Utf8PathBuf,
    /// `root` joined with every segment.
    pub full_path: Utf8PathBuf,
    /// Directory containing `full_path`.
    pub directory: Utf8PathBuf,
}

/// Resolves `key` against `cache_root` without touching the filesystem.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use cachedir_manager::{CacheKey, resolve};
///
/// let key = CacheKey::new(["CA", "Santa Clara", "f.csv"])?.package("p")?.version(2)?;
/// let resolved = resolve(&key, Utf8Path::new("/var/cache"));
/// assert_eq!(resolved.root, "/var/cache/p/2");
/// assert_eq!(resolved.full_path, "/var/cache/p/2/CA/Santa_Clara/f.csv");
/// assert_eq!(resolved.directory, "/var/cache/p/2/CA/Santa_Clara");
/// # Ok::<(), cachedir_manager::CacheError>(())
/// ```
#[must_use]
pub fn resolve(key: &CacheKey, cache_root: &Utf8Path) -> ResolvedPath {
    let root = key.package_name().map_or_else(
        || cache_root.to_path_buf(),
        |package| {
            cache_root
                .join(package)
                .join(key.schema_version().to_path_segment())
        },
    );
    let full_path = key
        .segments()
        .iter()
        .fold(root.clone(), |path, segment| path.join(segment));
    let directory = full_path
        .parent()
        .map_or_else(|| root.clone(), Utf8Path::to_path_buf);

    ResolvedPath {
        root,
        full_path,
        directory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_package_resolves_directly_under_root() {
        let key = CacheKey::file("f.csv").expect("key").no_package();
        let resolved = resolve(&key, Utf8Path::new("/cache"));
        assert_eq!(resolved.root, Utf8Path::new("/cache"));
        assert_eq!(resolved.full_path, Utf8Path::new("/cache/f.csv"));
        assert_eq!(resolved.directory, Utf8Path::new("/cache"));
    }

    #[test]
    fn package_and_version_scope_the_root() {
        let key = CacheKey::file("f.csv")
            .expect("key")
            .package("p")
            .expect("package")
            .version(2)
            .expect("version");
        let resolved = resolve(&key, Utf8Path::new("/cache"));
        assert_eq!(resolved.full_path, Utf8Path::new("/cache/p/2/f.csv"));
        assert_eq!(resolved.directory, Utf8Path::new("/cache/p/2"));
    }

    #[test]
    fn normalised_segments_appear_in_directory() {
        let key = CacheKey::new(["TEST", "Santa Clara", "name.csv"]).expect("key");
        let resolved = resolve(&key, Utf8Path::new("/cache"));
        assert_eq!(
            resolved.directory,
            Utf8Path::new("/cache/cache/0/TEST/Santa_Clara")
        );
    }
}
