//! Logical cache keys: package namespace, schema version, and path segments.

use std::fmt;

use crate::error::{CacheError, Result};

/// Package namespace used when a key does not name one explicitly.
pub const DEFAULT_PACKAGE: &str = "cache";

/// Schema version discriminator rendered as a single path segment.
///
/// # Examples
/// ```
/// use cachedir_manager::Version;
///
/// assert_eq!(Version::from(2).to_path_segment(), "2");
/// assert_eq!(Version::try_from(2.0).unwrap().to_path_segment(), "2.0");
/// assert_eq!(Version::from("v1").to_path_segment(), "v1");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Version {
    /// Free-form textual version such as `"v1"`.
    Text(String),
    /// Integral schema version.
    Int(i64),
    /// Fractional schema version. Always finite.
    Float(f64),
}

impl Version {
    /// Renders the version as the directory name used beneath the package.
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => render_float(*value),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_segment())
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Version {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Version {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl TryFrom<f64> for Version {
    type Error = CacheError;

    fn try_from(value: f64) -> Result<Self> {
        if value.is_finite() {
            Ok(Self::Float(value))
        } else {
            Err(CacheError::invalid(format!(
                "version {value} must be a finite number"
            )))
        }
    }
}

/// Renders a float the way a shortest round-trip decimal literal reads.
///
/// Integral floats keep a trailing `.0` so `2.0` and `2` map to different
/// directories. Decimal exponents below `-4` or from `16` up switch to
/// scientific notation with a signed, at least two-digit exponent (`1e+20`,
/// `1.5e-07`).
fn render_float(value: f64) -> String {
    let scientific = format!("{value:e}");
    let parsed = scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)));
    match parsed {
        Some((mantissa, exponent)) if !(-4..16).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
        }
        _ => {
            let plain = value.to_string();
            if plain.contains('.') {
                plain
            } else {
                format!("{plain}.0")
            }
        }
    }
}

/// Identifies a single cache file.
///
/// Segments have spaces replaced with underscores when the key is built; the
/// final segment is the file's `name.ext`.
///
/// # Examples
/// ```
/// use cachedir_manager::CacheKey;
///
/// let key = CacheKey::new(["CA", "Santa Clara", "data.csv"])?
///     .package("weather")?
///     .version(3)?;
/// assert_eq!(key.segments(), ["CA", "Santa_Clara", "data.csv"]);
/// assert_eq!(key.file_name(), "data.csv");
/// # Ok::<(), cachedir_manager::CacheError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    package: Option<String>,
    version: Version,
    segments: Vec<String>,
}

impl CacheKey {
    /// Builds a key under the default package and version.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] when no segments are supplied or
    /// a segment is empty, `.`/`..`, or contains a path separator.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalised = normalise_segments(segments)?;
        if normalised.is_empty() {
            return Err(CacheError::invalid(
                "a cache key needs at least one path segment naming the file",
            ));
        }
        Ok(Self {
            package: Some(DEFAULT_PACKAGE.to_owned()),
            version: Version::default(),
            segments: normalised,
        })
    }

    /// Builds a key from a single file name.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`CacheKey::new`].
    pub fn file(name: &str) -> Result<Self> {
        Self::new([name])
    }

    /// Places the key under `package`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] when the package name is not a
    /// single safe path component.
    pub fn package(mut self, package: &str) -> Result<Self> {
        validate_component(package, "package")?;
        self.package = Some(package.to_owned());
        Ok(self)
    }

    /// Resolves the key directly beneath the cache root without a package namespace.
    #[must_use]
    pub fn no_package(mut self) -> Self {
        self.package = None;
        self
    }

    /// Sets the schema version.
    ///
    /// Text versions have spaces replaced with underscores, like segments.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidArgument`] when a text version is empty,
    /// `.`/`..`, or contains a path separator.
    pub fn version(mut self, version: impl Into<Version>) -> Result<Self> {
        self.version = match version.into() {
            Version::Text(text) => Version::Text(normalise_component(&text, "version")?),
            other => other,
        };
        Ok(self)
    }

    /// Returns the package namespace, if any.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Returns the schema version.
    #[must_use]
    pub const fn schema_version(&self) -> &Version {
        &self.version
    }

    /// Returns the normalised path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the final segment, the cache file's `name.ext`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

/// Replaces spaces with underscores and validates every segment.
///
/// # Errors
///
/// Returns [`CacheError::InvalidArgument`] for empty, relative (`.`/`..`), or
/// separator-bearing segments.
pub fn normalise_segments<I, S>(segments: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|segment| normalise_component(segment.as_ref(), "path segment"))
        .collect()
}

fn normalise_component(value: &str, what: &str) -> Result<String> {
    let normalised = value.replace(' ', "_");
    validate_component(&normalised, what)?;
    Ok(normalised)
}

fn validate_component(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CacheError::invalid(format!("{what} must not be empty")));
    }
    if value == "." || value == ".." {
        return Err(CacheError::invalid(format!(
            "{what} {value:?} would escape the cache tree"
        )));
    }
    if value.contains(['/', '\\']) {
        return Err(CacheError::invalid(format!(
            "{what} {value:?} must not contain a path separator"
        )));
    }
    Ok(())
}
