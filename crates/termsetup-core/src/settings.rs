use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::escalation::EscalationTool;
use crate::layout::{ConfigLayout, TERMINAL_PACKAGE};
use crate::packager::Packager;
use crate::resource::{default_resources, resources_from_base, ConfigResource};

/// Optional on-disk defaults, read from `settings.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub packager: Option<String>,
    pub escalation_tool: Option<String>,
    pub resource_base_url: Option<String>,
}

impl SettingsFile {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse termsetup settings")
    }

    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings file: {}", path.display()));
            }
        };
        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid settings file: {}", path.display()))
            .map(Some)
    }
}

pub fn default_settings_path(home: &Path) -> PathBuf {
    home.join(".config").join("termsetup").join("settings.toml")
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub packager: Option<String>,
    pub escalation_tool: Option<String>,
    pub home: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
}

/// The process environment variables a setup run consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub packager: Option<String>,
    pub escalation_tool: Option<String>,
    pub home: Option<PathBuf>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Empty `PACKAGER` and `HOME` count as unset. A set but empty
    /// `ESCALATION_TOOL` means no wrapper, like `none`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            packager: non_empty("PACKAGER"),
            escalation_tool: lookup("ESCALATION_TOOL"),
            home: non_empty("HOME").map(PathBuf::from),
        }
    }
}

/// Everything `run` and `revert` need to know about the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupContext {
    pub home: PathBuf,
    pub packager: Packager,
    pub escalation: EscalationTool,
    pub package: String,
    pub resources: Vec<ConfigResource>,
}

impl SetupContext {
    pub fn layout(&self) -> ConfigLayout {
        ConfigLayout::for_home(&self.home)
    }

    pub fn resolve(overrides: &SettingsOverrides, env: &EnvSnapshot) -> Result<Self> {
        let home = overrides
            .home
            .clone()
            .or_else(|| env.home.clone())
            .ok_or_else(|| anyhow!("HOME is not set; cannot resolve the configuration directory"))?;

        let settings = match &overrides.settings_path {
            Some(path) => Some(SettingsFile::load(path)?.ok_or_else(|| {
                anyhow!("settings file does not exist: {}", path.display())
            })?),
            None => SettingsFile::load(&default_settings_path(&home))?,
        }
        .unwrap_or_default();

        Self::from_sources(home, overrides, env, settings)
    }

    pub fn from_sources(
        home: PathBuf,
        overrides: &SettingsOverrides,
        env: &EnvSnapshot,
        settings: SettingsFile,
    ) -> Result<Self> {
        let packager_name = overrides
            .packager
            .clone()
            .or_else(|| env.packager.clone())
            .or(settings.packager)
            .ok_or_else(|| {
                anyhow!("PACKAGER is not set; pass --packager or set it in the environment")
            })?;
        let packager = Packager::parse(&packager_name)?;

        let escalation_name = overrides
            .escalation_tool
            .clone()
            .or_else(|| env.escalation_tool.clone())
            .or(settings.escalation_tool)
            .ok_or_else(|| {
                anyhow!(
                    "ESCALATION_TOOL is not set; pass --escalation-tool (use 'none' when running as root)"
                )
            })?;
        let escalation = EscalationTool::parse(&escalation_name)?;

        let resources = match settings.resource_base_url.as_deref() {
            Some(base) => resources_from_base(base)?,
            None => default_resources(),
        };

        Ok(Self {
            home,
            packager,
            escalation,
            package: TERMINAL_PACKAGE.to_string(),
            resources,
        })
    }
}
