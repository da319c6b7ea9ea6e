use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use termsetup_core::SetupContext;
use tracing::info;

use crate::fs_utils::remove_dir_if_exists;
use crate::host::SetupHost;
use crate::plan::{plan_revert, PlannedStep};
use crate::state::inspect_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallDecision {
    NotInstalled,
    Kept,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertOutcome {
    NothingToRevert {
        backup: PathBuf,
    },
    Restored {
        live: PathBuf,
        uninstall: UninstallDecision,
    },
}

/// Puts the backed-up config back in place and optionally removes the package.
pub fn revert<H: SetupHost + ?Sized>(
    context: &SetupContext,
    host: &mut H,
) -> Result<RevertOutcome> {
    let state = inspect_state(context, host);
    let steps = plan_revert(context, &state);

    let mut restored_live = None;
    let mut uninstall = UninstallDecision::NotInstalled;

    for step in &steps {
        host.step_started(step);
        match step {
            PlannedStep::NothingToRevert { backup } => {
                info!(backup = %backup.display(), "no backup present");
                return Ok(RevertOutcome::NothingToRevert {
                    backup: backup.clone(),
                });
            }
            PlannedStep::RemoveLiveConfig { path } => {
                remove_dir_if_exists(path)?;
            }
            PlannedStep::RestoreBackup { backup, live } => {
                fs::rename(backup, live).with_context(|| {
                    format!(
                        "failed to restore {} to {}",
                        backup.display(),
                        live.display()
                    )
                })?;
                info!(live = %live.display(), "config restored from backup");
                restored_live = Some(live.clone());
            }
            PlannedStep::OfferUninstall { package, command } => {
                if host.confirm_uninstall(package)? {
                    host.run_package_command(command, &format!("failed to uninstall {package}"))?;
                    info!(%package, "package removed");
                    uninstall = UninstallDecision::Removed;
                } else {
                    uninstall = UninstallDecision::Kept;
                }
            }
            PlannedStep::InstallPackage { .. }
            | PlannedStep::PackageAlreadyInstalled { .. }
            | PlannedStep::BackupConfig { .. }
            | PlannedStep::KeepExistingBackup { .. }
            | PlannedStep::EnsureConfigDir { .. }
            | PlannedStep::FetchResource { .. } => {
                return Err(anyhow!("unexpected step in revert plan: {}", step.describe()));
            }
        }
    }

    let live = restored_live.ok_or_else(|| anyhow!("revert plan did not restore the backup"))?;
    Ok(RevertOutcome::Restored { live, uninstall })
}
