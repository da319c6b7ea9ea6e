use termsetup_core::SetupContext;

use crate::host::SetupHost;

/// Package presence and config directory presence, as observed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupState {
    pub package_installed: bool,
    pub live_config_present: bool,
    pub backup_present: bool,
}

pub fn inspect_state<H: SetupHost + ?Sized>(context: &SetupContext, host: &mut H) -> SetupState {
    let layout = context.layout();
    SetupState {
        package_installed: host.package_installed(&context.package),
        live_config_present: layout.live_dir().is_dir(),
        backup_present: layout.backup_dir().is_dir(),
    }
}
