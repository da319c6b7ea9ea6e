use std::path::Path;

use anyhow::Result;
use termsetup_core::{ConfigResource, PackageCommand};

use crate::fetch::FetchedResource;
use crate::plan::PlannedStep;

/// Everything the procedures need from the outside world.
///
/// The binary wires this to `PATH` lookups, real processes, HTTPS and the
/// terminal; tests substitute a scripted host.
pub trait SetupHost {
    fn package_installed(&mut self, package: &str) -> bool;

    fn run_package_command(
        &mut self,
        command: &PackageCommand,
        context_message: &str,
    ) -> Result<()>;

    fn fetch(&mut self, resource: &ConfigResource, destination: &Path) -> Result<FetchedResource>;

    /// Asks whether the package should be removed as well. Defaults to no.
    fn confirm_uninstall(&mut self, package: &str) -> Result<bool>;

    /// Called right before a step executes.
    fn step_started(&mut self, _step: &PlannedStep) {}
}
