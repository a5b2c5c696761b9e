//! Archiver that shells out to a `tar` executable.

use camino::Utf8Path;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

use super::Archiver;
use crate::error::{CacheError, Result};
use crate::observability::ARCHIVE_TARGET;

/// Program name used when none is configured.
pub const DEFAULT_TAR_PROGRAM: &str = "tar";

/// Runs the system `tar` for every pack and unpack.
///
/// Without a timeout the call blocks until `tar` exits.
#[derive(Debug, Clone)]
pub struct TarCommand {
    program: String,
    timeout: Option<Duration>,
}

impl TarCommand {
    /// Uses `tar` from `PATH` with no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_TAR_PROGRAM)
    }

    /// Uses a specific tar-compatible executable.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kills `tar` if it runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Name of the executable this archiver spawns.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[OsString]) -> Result<()> {
        debug!(
            target: ARCHIVE_TARGET,
            program = %self.program,
            args = ?args,
            "spawning archiver"
        );
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = self.execute(&mut command)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CacheError::ExternalTool {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    fn execute(&self, command: &mut Command) -> Result<Output> {
        let mut child = command
            .spawn()
            .map_err(|err| CacheError::io(format!("failed to spawn {}", self.program), err))?;

        let Some(timeout) = self.timeout else {
            return child
                .wait_with_output()
                .map_err(|err| CacheError::io(format!("failed to wait for {}", self.program), err));
        };

        let wait_result = child
            .wait_timeout(timeout)
            .map_err(|err| CacheError::io(format!("failed to wait for {}", self.program), err))?;
        if wait_result.is_some() {
            return child
                .wait_with_output()
                .map_err(|err| CacheError::io(format!("failed to collect {} output", self.program), err));
        }

        match child.kill() {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::InvalidInput => {}
            Err(err) => {
                return Err(CacheError::io(
                    format!("failed to terminate {} after {}s", self.program, timeout.as_secs()),
                    err,
                ));
            }
        }
        let output = child
            .wait_with_output()
            .map_err(|err| CacheError::io(format!("failed to collect {} output", self.program), err))?;
        Err(CacheError::ExternalTool {
            program: self.program.clone(),
            code: None,
            stderr: format!(
                "timed out after {}s\n{}",
                timeout.as_secs(),
                String::from_utf8_lossy(&output.stderr)
            ),
        })
    }
}

impl Default for TarCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Archiver for TarCommand {
    fn pack(&self, src_dir: &Utf8Path, dest_file: &Utf8Path, compressed: bool) -> Result<()> {
        self.run(&pack_args(src_dir, dest_file, compressed))
    }

    fn unpack(&self, src_file: &Utf8Path, dest_dir: &Utf8Path, compressed: bool) -> Result<()> {
        self.run(&unpack_args(src_file, dest_dir, compressed))
    }
}

fn pack_args(src_dir: &Utf8Path, dest_file: &Utf8Path, compressed: bool) -> Vec<OsString> {
    let mut args = vec![OsString::from("-c")];
    if compressed {
        args.push("-z".into());
    }
    args.extend([
        "-f".into(),
        dest_file.as_os_str().to_owned(),
        "-C".into(),
        src_dir.as_os_str().to_owned(),
        ".".into(),
    ]);
    args
}

fn unpack_args(src_file: &Utf8Path, dest_dir: &Utf8Path, compressed: bool) -> Vec<OsString> {
    let mut args = vec![OsString::from("-x")];
    if compressed {
        args.push("-z".into());
    }
    args.extend([
        "-f".into(),
        src_file.as_os_str().to_owned(),
        "-C".into(),
        dest_dir.as_os_str().to_owned(),
    ]);
    args
}
