//! Shell integration commands.

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::args::Cli;
use crate::error::FocusError;

/// Generate a completion script for `shell`.
///
/// # Errors
///
/// Returns `FocusError::Parse` if the generated script is not UTF-8.
pub fn completions(shell: Shell) -> Result<String, FocusError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, "tffocus", &mut buf);
    String::from_utf8(buf)
        .map_err(|e| FocusError::Parse(format!("Completion script is not UTF-8: {e}")))
}
