//! Manages the local cache directory: clears subtrees, reports disk usage, and
//! backs the whole root up to (or restores it from) a tar archive.
//!
//! The binary exits with `0` on success, `1` on error, `2` on usage errors,
//! and with `tar`'s own status when backup or restore fails. `--debug` lets
//! errors propagate so [`color_eyre`] prints the full report.

use std::io;
use std::process::ExitCode;

use cachedir_manager::cli::{self, CacheArgs, EXIT_OK, EXIT_SYNTAX, Outcome};
use clap::Parser;

fn main() -> color_eyre::eyre::Result<ExitCode> {
    let args = match CacheArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            err.print()?;
            let code = if err.use_stderr() { EXIT_SYNTAX } else { EXIT_OK };
            return Ok(ExitCode::from(code));
        }
    };

    cli::init_logging(&args);
    match cli::dispatch(&args, &mut io::stdout().lock(), &mut io::stderr().lock()) {
        Outcome::Exit(code) => Ok(ExitCode::from(code)),
        Outcome::Propagate(err) => {
            color_eyre::install()?;
            Err(color_eyre::eyre::Report::new(err))
        }
    }
}
