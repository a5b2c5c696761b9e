//! Command-line frontend for the `cache` binary.
//!
//! ```text
//! cache {clear|size|backup|restore} [--package PACKAGE] [--version VERSION]
//!       [-P|--path PATH] [-C|--cachedir CACHEDIR] [-f|--filename FILENAME]
//!       [-w|--warning] [-d|--debug]
//! ```
//!
//! `clear` and `size` act on `<cachedir>/<package>/<version>/<path>`, or on
//! `<cachedir>/<path>` without `--package`. `backup` and `restore` always cover
//! the whole cache root.

use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;
use tracing::Level;

use crate::cache::{
    CacheEntry, CacheKey, backup, clear_tree, current_root, display_path, format_size, path_size,
    restore, set_root,
};
use crate::error::{CacheError, Result};
use crate::settings::CacheEnvCfg;

/// Exit code on success.
pub const EXIT_OK: u8 = 0;

/// Exit code on syntax errors, as reported by the argument parser.
pub const EXIT_SYNTAX: u8 = 2;

/// Arguments accepted by the `cache` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cache",
    about = "Local cache directory manager",
    after_help = "Cache layout: <cachedir>/<package>/<version>/<path...>/<name.ext>"
)]
pub struct CacheArgs {
    /// Command to run: clear, size, backup, or restore.
    pub command: String,

    /// Package namespace the command is scoped to.
    #[arg(long)]
    pub package: Option<String>,

    /// Cache schema version beneath the package.
    #[arg(long, default_value = "0")]
    pub version: String,

    /// Slash-separated cache path beneath the package and version.
    #[arg(short = 'P', long, default_value = "")]
    pub path: String,

    /// Cache root directory.
    #[arg(short = 'C', long)]
    pub cachedir: Option<Utf8PathBuf>,

    /// Archive file used by backup and restore.
    #[arg(short = 'f', long, default_value = "cache.tar.gz")]
    pub filename: Utf8PathBuf,

    /// Show warning messages.
    #[arg(short = 'w', long)]
    pub warning: bool,

    /// Show debug logs and full error reports.
    #[arg(short = 'd', long)]
    pub debug: bool,
}

impl CacheArgs {
    /// Most verbose log level these arguments ask for.
    #[must_use]
    pub const fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.warning {
            Level::WARN
        } else {
            Level::ERROR
        }
    }

    /// Path segments below the cache root the command is scoped to.
    fn scope_segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        if let Some(package) = &self.package {
            segments.push(package.clone());
            segments.push(self.version.clone());
        }
        segments.extend(self.path_segments());
        segments
    }

    fn path_segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// What `main` should do once a command finishes.
#[derive(Debug)]
pub enum Outcome {
    /// Exit with this status.
    Exit(u8),
    /// Hand the error to the diagnostic reporter (debug mode).
    Propagate(CacheError),
}

/// Installs the stderr log subscriber at the level the arguments ask for.
pub fn init_logging(args: &CacheArgs) {
    let installed = tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(args.debug)
        .try_init();
    if let Err(error) = installed {
        tracing::debug!(%error, "log subscriber already installed");
    }
}

/// Runs the command and converts failures into exit codes.
///
/// Errors print a one-line `ERROR [cache]: ...` message to `err` and exit
/// with `1`, except archiver failures, which exit with the archiver's status.
/// With `--debug`, errors other than archiver failures are propagated.
pub fn dispatch<O: Write, E: Write>(args: &CacheArgs, out: &mut O, err: &mut E) -> Outcome {
    match run(args, out) {
        Ok(()) => Outcome::Exit(EXIT_OK),
        Err(error) if args.debug && !matches!(error, CacheError::ExternalTool { .. }) => {
            Outcome::Propagate(error)
        }
        Err(error) => {
            if let Err(write_error) = writeln!(err, "ERROR [cache]: {error}") {
                tracing::debug!(error = %write_error, "failed to report command error");
            }
            Outcome::Exit(error.exit_code())
        }
    }
}

/// Runs the command described by `args`, writing reports to `out`.
///
/// # Errors
///
/// Returns [`CacheError::InvalidArgument`] for unknown commands or unsafe
/// segments, and propagates failures from the underlying operation.
pub fn run<O: Write>(args: &CacheArgs, out: &mut O) -> Result<()> {
    if let Some(cachedir) = &args.cachedir {
        set_root(cachedir.clone(), true)?;
    }

    match args.command.as_str() {
        "clear" => clear(args),
        "size" => size(args, out),
        "backup" => with_archiver(|archiver| backup(&current_root(), &args.filename, archiver)),
        "restore" => with_archiver(|archiver| restore(&current_root(), &args.filename, archiver)),
        other => Err(CacheError::invalid(format!("command={other} is invalid"))),
    }
}

fn clear(args: &CacheArgs) -> Result<()> {
    let report = clear_tree(&current_root(), &args.scope_segments(), true)?;
    if !report.is_complete() {
        tracing::warn!(
            failures = report.failures.len(),
            "some cache entries could not be cleared"
        );
    }
    Ok(())
}

fn size<O: Write>(args: &CacheArgs, out: &mut O) -> Result<()> {
    let root = current_root();
    let path_segments = args.path_segments();
    let target = if path_segments.is_empty() {
        args.scope_segments()
            .iter()
            .fold(root.clone(), |path, segment| path.join(segment))
    } else {
        CacheEntry::new(scoped_key(args, &path_segments)?)?.into_path()
    };

    let bytes = path_size(&target)?;
    writeln!(out, "{} {}", display_path(&root, &target), format_size(bytes))
        .map_err(|error| CacheError::io("write size report", error))
}

fn scoped_key(args: &CacheArgs, path_segments: &[String]) -> Result<CacheKey> {
    let key = CacheKey::new(path_segments)?;
    match &args.package {
        Some(package) => key.package(package)?.version(args.version.as_str()),
        None => Ok(key.no_package()),
    }
}

fn with_archiver<F>(operation: F) -> Result<()>
where
    F: FnOnce(&dyn crate::cache::Archiver) -> Result<()>,
{
    let archiver = CacheEnvCfg::load()?.to_archiver()?;
    operation(archiver.as_ref())
}
