//! Default location of the cache root.
//!
//! Resolves the cache directory from environment variables with XDG-compliant
//! fallback paths.

use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Subdirectory name within the XDG cache home.
const CACHE_SUBDIR: &str = "cachedir-manager";

/// Environment variable that overrides the default cache root.
pub const CACHE_DIR_ENV: &str = "CACHE_DIR";

/// Resolves the default cache root from environment and XDG conventions.
///
/// The resolution order is:
///
/// 1. `CACHE_DIR` environment variable if set, non-blank, and valid UTF-8
/// 2. `$XDG_CACHE_HOME/cachedir-manager` if `XDG_CACHE_HOME` is set
/// 3. `~/.cache/cachedir-manager` as fallback
/// 4. `<temp dir>/cachedir-manager` as last resort
///
/// # Examples
///
/// ```
/// use cachedir_manager::resolve_cache_dir;
///
/// let cache_dir = resolve_cache_dir();
/// assert!(!cache_dir.as_str().is_empty());
/// ```
#[must_use]
pub fn resolve_cache_dir() -> Utf8PathBuf {
    resolve_from_env()
        .or_else(resolve_from_xdg_cache)
        .or_else(resolve_from_home)
        .unwrap_or_else(resolve_from_temp)
}

fn resolve_from_env() -> Option<Utf8PathBuf> {
    non_blank_path(CACHE_DIR_ENV)
}

fn resolve_from_xdg_cache() -> Option<Utf8PathBuf> {
    Some(non_blank_path("XDG_CACHE_HOME")?.join(CACHE_SUBDIR))
}

fn resolve_from_home() -> Option<Utf8PathBuf> {
    let home = dirs::home_dir()?;
    let path = Utf8PathBuf::from_path_buf(home).ok()?;
    Some(path.join(".cache").join(CACHE_SUBDIR))
}

fn resolve_from_temp() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
        .join(CACHE_SUBDIR)
}

fn non_blank_path(var: &str) -> Option<Utf8PathBuf> {
    let raw = std::env::var(var).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Utf8PathBuf::from_path_buf(PathBuf::from(trimmed)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_env::with_vars;

    #[test]
    fn resolve_cache_dir_respects_explicit_env_var() {
        let expected = "/custom/cache/path";
        let result = with_vars(
            [
                (CACHE_DIR_ENV, Some(expected)),
                ("XDG_CACHE_HOME", None::<&str>),
            ],
            resolve_cache_dir,
        );
        assert_eq!(result.as_str(), expected);
    }

    #[test]
    fn resolve_cache_dir_uses_xdg_cache_home_when_env_var_unset() {
        let xdg_cache = "/home/testuser/.cache";
        let result = with_vars(
            [
                (CACHE_DIR_ENV, None::<&str>),
                ("XDG_CACHE_HOME", Some(xdg_cache)),
            ],
            resolve_cache_dir,
        );
        assert_eq!(result.as_str(), format!("{xdg_cache}/{CACHE_SUBDIR}"));
    }

    #[test]
    fn resolve_cache_dir_ignores_whitespace_only_env_var() {
        let xdg_cache = "/home/testuser/.cache";
        let result = with_vars(
            [
                (CACHE_DIR_ENV, Some("   ")),
                ("XDG_CACHE_HOME", Some(xdg_cache)),
            ],
            resolve_cache_dir,
        );
        assert_eq!(result.as_str(), format!("{xdg_cache}/{CACHE_SUBDIR}"));
    }

    #[test]
    fn resolve_cache_dir_falls_back_to_home() {
        let result = with_vars(
            [
                (CACHE_DIR_ENV, None::<&str>),
                ("XDG_CACHE_HOME", None::<&str>),
            ],
            resolve_cache_dir,
        );
        assert!(result.as_str().ends_with(CACHE_SUBDIR));
    }
}
