//! Domain error types for the cache directory manager.

use camino::Utf8PathBuf;
use color_eyre::Report;
use std::io;
use thiserror::Error;

/// Result alias for operations that may return a [`CacheError`].
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result alias for configuration fallible operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Exit code reported for general failures.
pub const EXIT_FAILED: u8 = 1;

/// Top-level error exposed by the crate.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A package, version, or path segment was rejected at the API boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The cache file does not exist and the caller asked for strictness.
    #[error("{path} not found")]
    NotFound {
        /// Path that was expected to exist.
        path: Utf8PathBuf,
    },
    /// An underlying filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        /// Describes the operation that failed.
        context: String,
        /// Original operating system error.
        #[source]
        source: io::Error,
    },
    /// The archiver finished unsuccessfully.
    #[error("{program} failed{}{}", code_suffix(.code), stderr_suffix(.stderr))]
    ExternalTool {
        /// Name of the archiver that failed.
        program: String,
        /// Exit status reported by the archiver, if it exited normally.
        code: Option<i32>,
        /// Diagnostic output captured from the archiver.
        stderr: String,
    },
    /// Indicates configuration parsing failed.
    #[error("configuration parsing failed")]
    Config(#[from] ConfigError),
}

impl CacheError {
    /// Wraps an I/O error with a description of the failing operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Builds a [`CacheError::InvalidArgument`] from a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns the process exit code this error maps to.
    ///
    /// Archiver failures propagate the archiver's own status so callers of
    /// the command-line frontend see what `tar` reported. Statuses that do
    /// not fit an exit code collapse to the general failure code.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ExternalTool {
                code: Some(code), ..
            } => u8::try_from(*code)
                .ok()
                .filter(|value| *value != 0)
                .unwrap_or(EXIT_FAILED),
            _ => EXIT_FAILED,
        }
    }
}

fn code_suffix(code: &Option<i32>) -> String {
    code.map_or_else(
        || " (terminated without an exit status)".to_owned(),
        |value| format!(" with exit status {value}"),
    )
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Captures configuration failures.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConfigError(#[from] Report);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(2), 2)]
    #[case(Some(0), EXIT_FAILED)]
    #[case(Some(300), EXIT_FAILED)]
    #[case(None, EXIT_FAILED)]
    fn external_tool_exit_code_follows_archiver(#[case] code: Option<i32>, #[case] expected: u8) {
        let err = CacheError::ExternalTool {
            program: "tar".to_owned(),
            code,
            stderr: String::new(),
        };
        assert_eq!(err.exit_code(), expected);
    }

    #[test]
    fn other_errors_exit_with_general_failure() {
        let err = CacheError::invalid("bad segment");
        assert_eq!(err.exit_code(), EXIT_FAILED);
    }

    #[test]
    fn external_tool_message_includes_stderr() {
        let err = CacheError::ExternalTool {
            program: "tar".to_owned(),
            code: Some(2),
            stderr: "tar: x.tar: Cannot open\n".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "tar failed with exit status 2: tar: x.tar: Cannot open"
        );
    }
}
