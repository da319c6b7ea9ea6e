use std::process::Command;

use anyhow::{anyhow, Context, Result};
use termsetup_core::PackageCommand;
use tracing::debug;

/// Runs a package manager invocation with the terminal attached, so the
/// escalation tool can ask for a password and progress stays visible.
pub fn run_package_command(command: &PackageCommand, context_message: &str) -> Result<()> {
    debug!(command = %command, "running package command");
    let mut process = command.to_command();
    run_command(&mut process, context_message)
}

pub(crate) fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if status.success() {
        return Ok(());
    }

    Err(anyhow!(
        "{context_message}: status={status} command={:?}",
        command
    ))
}

/// Whether an executable named `name` is reachable on `PATH`.
pub fn command_exists(name: &str) -> bool {
    which::which(name).is_ok()
}
