//! Archive settings supplied via environment variables.

use color_eyre::eyre::eyre;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::time::Duration;

use crate::cache::{Archiver, NativeTar, TarCommand};
use crate::error::{ConfigError, ConfigResult};

/// Archiver selected by `CACHE_ARCHIVER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiverKind {
    /// Spawn the system `tar`.
    #[default]
    Command,
    /// Archive in-process.
    Native,
}

impl ArchiverKind {
    fn parse(raw: &str) -> ConfigResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "command" | "tar" => Ok(Self::Command),
            "native" => Ok(Self::Native),
            other => Err(ConfigError::from(eyre!(
                "CACHE_ARCHIVER must be 'command' or 'native', got '{other}'"
            ))),
        }
    }
}

/// Captures cache settings supplied via environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, OrthoConfig, Default)]
#[ortho_config(prefix = "CACHE")]
///
/// # Examples
/// ```
/// use cachedir_manager::CacheEnvCfg;
///
/// let cfg = CacheEnvCfg::default();
/// assert!(cfg.archiver.is_none());
/// ```
pub struct CacheEnvCfg {
    /// Archiver used by backup and restore: `command` (default) or `native`.
    pub archiver: Option<String>,
    /// Executable spawned by the `command` archiver.
    pub tar_program: Option<String>,
    /// Seconds the `command` archiver may run before it is killed.
    pub archive_timeout_secs: Option<u64>,
}

impl CacheEnvCfg {
    /// Loads configuration from environment variables without parsing CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable cannot be parsed.
    pub fn load() -> ConfigResult<Self> {
        let args = [OsString::from("cache")];
        Self::load_from_iter(args).map_err(|err| ConfigError::from(eyre!(err)))
    }

    /// Returns the configured archiver kind.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unknown archiver name.
    pub fn archiver_kind(&self) -> ConfigResult<ArchiverKind> {
        self.archiver
            .as_deref()
            .map_or(Ok(ArchiverKind::default()), ArchiverKind::parse)
    }

    /// Builds the archiver described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unknown archiver name.
    pub fn to_archiver(&self) -> ConfigResult<Box<dyn Archiver>> {
        match self.archiver_kind()? {
            ArchiverKind::Native => Ok(Box::new(NativeTar)),
            ArchiverKind::Command => Ok(Box::new(self.tar_command())),
        }
    }

    fn tar_command(&self) -> TarCommand {
        let command = self
            .tar_program
            .as_deref()
            .map_or_else(TarCommand::new, TarCommand::with_program);
        match self.archive_timeout_secs {
            Some(secs) => command.with_timeout(Duration::from_secs(secs)),
            None => command,
        }
    }
}
