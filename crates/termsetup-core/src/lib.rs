mod escalation;
mod layout;
mod packager;
mod resource;
mod settings;

pub use escalation::EscalationTool;
pub use layout::{ConfigLayout, TERMINAL_PACKAGE};
pub use packager::{PackageCommand, Packager};
pub use resource::{
    default_resources, resources_from_base, ConfigResource, DEFAULT_RESOURCE_BASE_URL,
};
pub use settings::{
    default_settings_path, EnvSnapshot, SettingsFile, SettingsOverrides, SetupContext,
};
