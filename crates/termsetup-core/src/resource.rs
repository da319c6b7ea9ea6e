use anyhow::{anyhow, Result};

pub const DEFAULT_RESOURCE_BASE_URL: &str =
    "https://github.com/ChrisTitusTech/dwm-titus/raw/main/config/alacritty";

const RESOURCE_FILE_NAMES: [&str; 2] = ["alacritty.toml", "nordic.toml"];

/// A remote file written verbatim into the live config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResource {
    pub file_name: String,
    pub url: String,
}

pub fn default_resources() -> Vec<ConfigResource> {
    // The default base is a constant https URL, so it always validates.
    resources_from_base(DEFAULT_RESOURCE_BASE_URL).unwrap_or_default()
}

pub fn resources_from_base(base_url: &str) -> Result<Vec<ConfigResource>> {
    let base = base_url.trim().trim_end_matches('/');
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(anyhow!(
            "resource base URL must use http or https: '{base_url}'"
        ));
    }
    if base.contains('?') || base.contains('#') {
        return Err(anyhow!(
            "resource base URL must not carry a query or fragment: '{base_url}'"
        ));
    }

    Ok(RESOURCE_FILE_NAMES
        .iter()
        .map(|file_name| ConfigResource {
            file_name: (*file_name).to_string(),
            url: format!("{base}/{file_name}"),
        })
        .collect())
}
