use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use termsetup_core::SetupContext;
use tracing::info;

use crate::fetch::FetchedResource;
use crate::fs_utils::copy_dir_recursive;
use crate::host::SetupHost;
use crate::plan::{plan_install, PlannedStep};
use crate::state::inspect_state;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageAction {
    Installed,
    AlreadyInstalled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    /// No live config existed, so there was nothing to back up.
    NotNeeded,
    Created(PathBuf),
    KeptExisting(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub package: PackageAction,
    pub backup: BackupAction,
    pub fetched: Vec<FetchedResource>,
}

/// Installs the terminal if needed, backs up its config and fetches fresh
/// config files. Stops at the first failing step.
pub fn install<H: SetupHost + ?Sized>(
    context: &SetupContext,
    host: &mut H,
) -> Result<InstallOutcome> {
    let state = inspect_state(context, host);
    let steps = plan_install(context, &state);

    let mut outcome = InstallOutcome {
        package: PackageAction::AlreadyInstalled,
        backup: BackupAction::NotNeeded,
        fetched: Vec::with_capacity(context.resources.len()),
    };

    for step in &steps {
        host.step_started(step);
        match step {
            PlannedStep::InstallPackage { package, command } => {
                host.run_package_command(command, &format!("failed to install {package}"))?;
                info!(%package, "package installed");
                outcome.package = PackageAction::Installed;
            }
            PlannedStep::PackageAlreadyInstalled { .. } => {
                outcome.package = PackageAction::AlreadyInstalled;
            }
            PlannedStep::BackupConfig { live, backup } => {
                copy_dir_recursive(live, backup).with_context(|| {
                    format!(
                        "failed to back up {} to {}",
                        live.display(),
                        backup.display()
                    )
                })?;
                info!(backup = %backup.display(), "config backed up");
                outcome.backup = BackupAction::Created(backup.clone());
            }
            PlannedStep::KeepExistingBackup { backup } => {
                outcome.backup = BackupAction::KeptExisting(backup.clone());
            }
            PlannedStep::EnsureConfigDir { path } => {
                fs::create_dir_all(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
            }
            PlannedStep::FetchResource {
                resource,
                destination,
            } => {
                let fetched = host.fetch(resource, destination)?;
                info!(
                    file = %fetched.file_name,
                    bytes = fetched.bytes,
                    sha256 = %fetched.sha256,
                    "resource written"
                );
                outcome.fetched.push(fetched);
            }
            PlannedStep::NothingToRevert { .. }
            | PlannedStep::RemoveLiveConfig { .. }
            | PlannedStep::RestoreBackup { .. }
            | PlannedStep::OfferUninstall { .. } => {
                return Err(anyhow!("unexpected step in install plan: {}", step.describe()));
            }
        }
    }

    Ok(outcome)
}
