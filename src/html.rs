use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::checksum;
use crate::download::{self, RequestOptions};
use crate::error::{IacEnvError, Result};

static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid href regex"));

/// Build direct download URLs by joining each expected asset name onto a
/// release base URL. Used by the Direct-URL retrieval mode, which never
/// fetches a listing page.
pub fn build_asset_urls(base_url: &str, file_names: &[&str]) -> Result<Vec<String>> {
    file_names
        .iter()
        .map(|file_name| download::join_url(base_url, &[file_name]))
        .collect()
}

/// Scrape a directory listing page for the expected asset file names.
///
/// Returns absolute URLs in the same order as `file_names`; fails if any
/// expected name has no matching link on the page.
pub async fn find_asset_urls(
    client: &Client,
    cancel: &CancellationToken,
    base_url: &str,
    file_names: &[&str],
    options: &RequestOptions,
) -> Result<Vec<String>> {
    let page = fetch_page(client, cancel, base_url, options).await?;
    let hrefs = extract_hrefs(&page);
    let base = Url::parse(base_url)?;

    file_names
        .iter()
        .map(|file_name| {
            let href = hrefs
                .iter()
                .find(|href| {
                    let trimmed = href.trim_end_matches('/');
                    trimmed == *file_name || trimmed.ends_with(&format!("/{file_name}"))
                })
                .ok_or_else(|| IacEnvError::AssetNotFound {
                    file_name: file_name.to_string(),
                    url: base_url.to_string(),
                })?;

            Ok(base.join(href)?.into())
        })
        .collect()
}

/// Enumerate release identifiers from a browsable index page.
///
/// Entries keep document order, first occurrence wins.
pub async fn list_releases(
    client: &Client,
    cancel: &CancellationToken,
    base_url: &str,
    options: &RequestOptions,
) -> Result<Vec<String>> {
    let page = fetch_page(client, cancel, base_url, options).await?;

    Ok(releases_from_hrefs(&extract_hrefs(&page)))
}

async fn fetch_page(
    client: &Client,
    cancel: &CancellationToken,
    url: &str,
    options: &RequestOptions,
) -> Result<String> {
    let data = download::bytes(client, cancel, url, checksum::no_check, options).await?;

    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn extract_hrefs(page: &str) -> Vec<&str> {
    HREF_RE
        .captures_iter(page)
        .filter_map(|capture| capture.get(1))
        .map(|m| m.as_str())
        .collect()
}

fn releases_from_hrefs(hrefs: &[&str]) -> Vec<String> {
    let mut releases = Vec::new();

    for href in hrefs {
        if href.contains('?') || href.contains('#') {
            continue;
        }

        let Some(entry) = href.trim_end_matches('/').rsplit('/').next() else {
            continue;
        };
        if entry.is_empty() || entry == ".." || entry == "." {
            continue;
        }

        let entry = entry.to_string();
        if !releases.contains(&entry) {
            releases.push(entry);
        }
    }

    releases
}
