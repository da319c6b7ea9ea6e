use std::path::PathBuf;

use termsetup_core::{ConfigResource, PackageCommand, SetupContext};

use crate::state::SetupState;

/// One unit of work in a `run` or `revert` procedure, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedStep {
    InstallPackage {
        package: String,
        command: PackageCommand,
    },
    PackageAlreadyInstalled {
        package: String,
    },
    BackupConfig {
        live: PathBuf,
        backup: PathBuf,
    },
    KeepExistingBackup {
        backup: PathBuf,
    },
    EnsureConfigDir {
        path: PathBuf,
    },
    FetchResource {
        resource: ConfigResource,
        destination: PathBuf,
    },
    NothingToRevert {
        backup: PathBuf,
    },
    RemoveLiveConfig {
        path: PathBuf,
    },
    RestoreBackup {
        backup: PathBuf,
        live: PathBuf,
    },
    OfferUninstall {
        package: String,
        command: PackageCommand,
    },
}

impl PlannedStep {
    pub fn describe(&self) -> String {
        match self {
            Self::InstallPackage { package, command } => {
                format!("install {package}: {command}")
            }
            Self::PackageAlreadyInstalled { package } => {
                format!("{package} is already installed")
            }
            Self::BackupConfig { live, backup } => format!(
                "back up {} to {}",
                live.display(),
                backup.display()
            ),
            Self::KeepExistingBackup { backup } => {
                format!("keep existing backup {}", backup.display())
            }
            Self::EnsureConfigDir { path } => format!("create {}", path.display()),
            Self::FetchResource {
                resource,
                destination,
            } => format!("fetch {} -> {}", resource.url, destination.display()),
            Self::NothingToRevert { backup } => format!(
                "no backup at {}; nothing to revert",
                backup.display()
            ),
            Self::RemoveLiveConfig { path } => format!("remove {}", path.display()),
            Self::RestoreBackup { backup, live } => format!(
                "restore {} to {}",
                backup.display(),
                live.display()
            ),
            Self::OfferUninstall { package, command } => {
                format!("offer to uninstall {package}: {command}")
            }
        }
    }
}

pub fn plan_install(context: &SetupContext, state: &SetupState) -> Vec<PlannedStep> {
    let layout = context.layout();
    let mut steps = Vec::with_capacity(3 + context.resources.len());

    if state.package_installed {
        steps.push(PlannedStep::PackageAlreadyInstalled {
            package: context.package.clone(),
        });
    } else {
        steps.push(PlannedStep::InstallPackage {
            package: context.package.clone(),
            command: context
                .packager
                .install_command(&context.escalation, &context.package),
        });
    }

    if state.live_config_present {
        if state.backup_present {
            steps.push(PlannedStep::KeepExistingBackup {
                backup: layout.backup_dir(),
            });
        } else {
            steps.push(PlannedStep::BackupConfig {
                live: layout.live_dir(),
                backup: layout.backup_dir(),
            });
        }
    }

    steps.push(PlannedStep::EnsureConfigDir {
        path: layout.live_dir(),
    });
    for resource in &context.resources {
        steps.push(PlannedStep::FetchResource {
            resource: resource.clone(),
            destination: layout.resource_path(&resource.file_name),
        });
    }

    steps
}

pub fn plan_revert(context: &SetupContext, state: &SetupState) -> Vec<PlannedStep> {
    let layout = context.layout();
    if !state.backup_present {
        return vec![PlannedStep::NothingToRevert {
            backup: layout.backup_dir(),
        }];
    }

    let mut steps = Vec::with_capacity(3);
    if state.live_config_present {
        steps.push(PlannedStep::RemoveLiveConfig {
            path: layout.live_dir(),
        });
    }
    steps.push(PlannedStep::RestoreBackup {
        backup: layout.backup_dir(),
        live: layout.live_dir(),
    });
    if state.package_installed {
        steps.push(PlannedStep::OfferUninstall {
            package: context.package.clone(),
            command: context
                .packager
                .remove_command(&context.escalation, &context.package),
        });
    }
    steps
}
