use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use termsetup_core::ConfigResource;
use tracing::debug;

use crate::fs_utils::remove_file_if_exists;

/// A resource that has been written to its final location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("termsetup/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn fetch(&self, resource: &ConfigResource, destination: &Path) -> Result<FetchedResource> {
        debug!(url = %resource.url, destination = %destination.display(), "fetching resource");
        let response = self
            .client
            .get(&resource.url)
            .send()
            .with_context(|| format!("failed to request {}", resource.url))?
            .error_for_status()
            .with_context(|| format!("remote host rejected {}", resource.url))?;
        let body = response
            .bytes()
            .with_context(|| format!("failed to read response body from {}", resource.url))?;

        persist_resource(resource, destination, &body)
    }
}

/// Writes `payload` next to `destination` as `.part`, then renames it over
/// `destination`. A failed write or rename leaves no `.part` file behind.
pub fn persist_resource(
    resource: &ConfigResource,
    destination: &Path,
    payload: &[u8],
) -> Result<FetchedResource> {
    let part_path = part_path_for(destination);
    if let Err(err) = fs::write(&part_path, payload) {
        let _ = remove_file_if_exists(&part_path);
        return Err(err)
            .with_context(|| format!("failed to write download: {}", part_path.display()));
    }

    if let Err(err) = fs::rename(&part_path, destination) {
        let _ = remove_file_if_exists(&part_path);
        return Err(err).with_context(|| {
            format!(
                "failed to move download into place: {}",
                destination.display()
            )
        });
    }

    Ok(FetchedResource {
        file_name: resource.file_name.clone(),
        path: destination.to_path_buf(),
        bytes: payload.len() as u64,
        sha256: sha256_hex(payload),
    })
}

fn part_path_for(destination: &Path) -> PathBuf {
    destination.with_file_name(format!(
        "{}.part",
        destination
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("resource")
    ))
}

pub(crate) fn sha256_hex(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}
