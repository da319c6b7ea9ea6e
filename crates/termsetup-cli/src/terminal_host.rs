use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use termsetup_core::{ConfigResource, PackageCommand};
use termsetup_installer::{
    command_exists, run_package_command, FetchedResource, HttpFetcher, PlannedStep, SetupHost,
};

use crate::render::TerminalRenderer;

/// How the revert prompt gets its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UninstallPolicy {
    Ask,
    AssumeYes,
    AssumeNo,
}

impl UninstallPolicy {
    pub(crate) fn from_flags(yes: bool, keep_package: bool) -> Self {
        match (yes, keep_package) {
            (true, _) => Self::AssumeYes,
            (false, true) => Self::AssumeNo,
            (false, false) => Self::Ask,
        }
    }
}

pub(crate) struct TerminalHost {
    renderer: TerminalRenderer,
    fetcher: HttpFetcher,
    uninstall_policy: UninstallPolicy,
}

impl TerminalHost {
    pub(crate) fn new(
        renderer: TerminalRenderer,
        uninstall_policy: UninstallPolicy,
    ) -> Result<Self> {
        Ok(Self {
            renderer,
            fetcher: HttpFetcher::new()?,
            uninstall_policy,
        })
    }
}

impl SetupHost for TerminalHost {
    fn package_installed(&mut self, package: &str) -> bool {
        command_exists(package)
    }

    fn run_package_command(
        &mut self,
        command: &PackageCommand,
        context_message: &str,
    ) -> Result<()> {
        run_package_command(command, context_message)
    }

    fn fetch(&mut self, resource: &ConfigResource, destination: &Path) -> Result<FetchedResource> {
        let spinner = self.renderer.start_spinner(&resource.file_name);
        match self.fetcher.fetch(resource, destination) {
            Ok(fetched) => {
                spinner.finish_success(fetched.bytes);
                Ok(fetched)
            }
            Err(err) => {
                spinner.finish_abandon();
                Err(err)
            }
        }
    }

    fn confirm_uninstall(&mut self, package: &str) -> Result<bool> {
        match self.uninstall_policy {
            UninstallPolicy::AssumeYes => Ok(true),
            UninstallPolicy::AssumeNo => Ok(false),
            UninstallPolicy::Ask => {
                let stdin = io::stdin();
                let mut stdout = io::stdout();
                read_confirmation(&mut stdin.lock(), &mut stdout, package)
            }
        }
    }

    fn step_started(&mut self, step: &PlannedStep) {
        if let Some(status) = step_status(step) {
            self.renderer.print_status(status, &step.describe());
        }
    }
}

/// Badge for a step announcement. `None` when the outcome lines already
/// report the step.
pub(crate) fn step_status(step: &PlannedStep) -> Option<&'static str> {
    match step {
        PlannedStep::NothingToRevert { .. } => None,
        PlannedStep::PackageAlreadyInstalled { .. } => Some("ok"),
        PlannedStep::KeepExistingBackup { .. } => Some("warn"),
        _ => Some("step"),
    }
}

pub(crate) fn read_confirmation<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    package: &str,
) -> Result<bool> {
    write!(writer, "Do you want to uninstall {package} as well? (y/N): ")
        .context("failed writing uninstall prompt")?;
    writer.flush().context("failed flushing uninstall prompt")?;

    let mut answer = String::new();
    reader
        .read_line(&mut answer)
        .context("failed reading uninstall answer")?;
    Ok(is_affirmative(&answer))
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
