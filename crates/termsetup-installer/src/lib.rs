mod command;
mod fetch;
mod fs_utils;
mod host;
mod install;
mod plan;
mod revert;
mod state;

pub use command::{command_exists, run_package_command};
pub use fetch::{persist_resource, FetchedResource, HttpFetcher};
pub use host::SetupHost;
pub use install::{install, BackupAction, InstallOutcome, PackageAction};
pub use plan::{plan_install, plan_revert, PlannedStep};
pub use revert::{revert, RevertOutcome, UninstallDecision};
pub use state::{inspect_state, SetupState};

#[cfg(test)]
mod tests;
