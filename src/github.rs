use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::checksum;
use crate::download::{self, RequestOptions};
use crate::error::{IacEnvError, Result};

pub const RELEASES: &str = "releases";
pub const DOWNLOAD: &str = "download";

const PER_PAGE: usize = 100;

/// Release metadata from a GitHub-compatible API.
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

/// Release asset from a GitHub-compatible API.
#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

/// Resolve download URLs for the expected asset file names of a tagged
/// release, matched by exact name.
pub async fn asset_download_urls(
    client: &Client,
    cancel: &CancellationToken,
    tag: &str,
    file_names: &[&str],
    api_url: &str,
    options: &RequestOptions,
) -> Result<Vec<String>> {
    let url = download::join_url(api_url, &[RELEASES, "tags", tag])?;
    let data = download::bytes(client, cancel, &url, checksum::no_check, options).await?;
    let release: Release = serde_json::from_slice(&data).map_err(|err| {
        IacEnvError::InvalidResponse {
            url: url.clone(),
            message: err.to_string(),
        }
    })?;

    file_names
        .iter()
        .map(|file_name| {
            release
                .assets
                .iter()
                .find(|asset| asset.name == *file_name)
                .map(|asset| asset.browser_download_url.clone())
                .ok_or_else(|| IacEnvError::AssetNotFound {
                    file_name: file_name.to_string(),
                    url: url.clone(),
                })
        })
        .collect()
}

/// Enumerate release tags from a GitHub-compatible releases endpoint,
/// paginating until a short page, in API order.
pub async fn list_releases(
    client: &Client,
    cancel: &CancellationToken,
    api_url: &str,
    options: &RequestOptions,
) -> Result<Vec<String>> {
    let base_url = download::join_url(api_url, &[RELEASES])?;
    let mut versions = Vec::new();
    let mut page = 1;

    loop {
        let url = format!("{base_url}?per_page={PER_PAGE}&page={page}");
        let data = download::bytes(client, cancel, &url, checksum::no_check, options).await?;
        let releases: Vec<Release> = serde_json::from_slice(&data).map_err(|err| {
            IacEnvError::InvalidResponse {
                url: url.clone(),
                message: err.to_string(),
            }
        })?;

        let page_len = releases.len();
        versions.extend(releases.into_iter().map(|release| release.tag_name));

        if page_len < PER_PAGE {
            return Ok(versions);
        }
        page += 1;
    }
}
