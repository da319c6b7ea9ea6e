use std::path::{Path, PathBuf};

pub const TERMINAL_PACKAGE: &str = "alacritty";

const LIVE_DIR_NAME: &str = "alacritty";
const BACKUP_DIR_NAME: &str = "alacritty-bak";

/// Where the terminal's configuration lives under a user's home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    config_home: PathBuf,
}

impl ConfigLayout {
    pub fn new(config_home: impl Into<PathBuf>) -> Self {
        Self {
            config_home: config_home.into(),
        }
    }

    pub fn for_home(home: &Path) -> Self {
        Self::new(home.join(".config"))
    }

    pub fn config_home(&self) -> &Path {
        &self.config_home
    }

    pub fn live_dir(&self) -> PathBuf {
        self.config_home.join(LIVE_DIR_NAME)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.config_home.join(BACKUP_DIR_NAME)
    }

    pub fn resource_path(&self, file_name: &str) -> PathBuf {
        self.live_dir().join(file_name)
    }
}
