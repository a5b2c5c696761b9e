//! Skip heuristics for tests that depend on external tools.

use std::process::{Command, Stdio};

/// Prefix used by messages that tests print when they skip.
pub const SKIP_PREFIX: &str = "SKIP-CACHE-TEST";

/// Reports whether a runnable `tar` is on `PATH`.
#[must_use]
pub fn tar_available() -> bool {
    Command::new("tar")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Formats the message printed when a test skips because `tool` is missing.
#[must_use]
pub fn skip_message(test: &str, tool: &str) -> String {
    format!("{SKIP_PREFIX}: {test} skipped because {tool} is unavailable")
}
