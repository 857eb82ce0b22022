use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::checksum;
use crate::config::{Config, InstallMode, ListMode, ATMOS_TOOL_NAME};
use crate::download;
use crate::error::{IacEnvError, Result};
use crate::github;
use crate::html;
use crate::platform::Platform;

const CLOUDPOSSE_ORG: &str = "cloudposse";
const ATMOS_BASE_FILE_NAME: &str = "atmos_";

/// Per-tool orchestrator composing asset location, download and
/// verification. One implementation per upstream tool, sharing the
/// collaborators.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Install `version` into `target_path`.
    async fn install(
        &self,
        cancel: &CancellationToken,
        version: &str,
        target_path: &Path,
    ) -> Result<()>;

    /// Enumerate versions available upstream, in the order the configured
    /// listing collaborator reports them.
    async fn list_versions(&self, cancel: &CancellationToken) -> Result<Vec<String>>;
}

impl std::fmt::Debug for dyn Retriever + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Retriever")
    }
}

pub fn retriever_for<'a>(tool: &str, conf: &'a Config) -> Result<Box<dyn Retriever + 'a>> {
    match tool {
        ATMOS_TOOL_NAME => Ok(Box::new(AtmosRetriever::new(conf))),
        other => Err(IacEnvError::UnknownTool {
            tool: other.to_string(),
        }),
    }
}

pub struct AtmosRetriever<'a> {
    conf: &'a Config,
}

impl<'a> AtmosRetriever<'a> {
    pub fn new(conf: &'a Config) -> Self {
        Self { conf }
    }

    /// Options for binary/manifest downloads: basic-auth only. The GitHub
    /// token must never reach a configured mirror host.
    fn request_options(&self) -> download::RequestOptions {
        self.conf.request_options(ATMOS_TOOL_NAME)
    }

    /// Options for GitHub-compatible API calls: basic-auth plus the token.
    fn api_request_options(&self) -> download::RequestOptions {
        self.request_options()
            .with_bearer_token(self.conf.github_token.as_deref())
    }
}

#[async_trait]
impl Retriever for AtmosRetriever<'_> {
    async fn install(
        &self,
        cancel: &CancellationToken,
        version: &str,
        target_path: &Path,
    ) -> Result<()> {
        let settings = self.conf.atmos.init_remote_conf(&self.conf.getenv)?;

        // atmos tags carry a leading 'v', asset names do not
        let (tag, version) = normalize_version(version);
        let (file_name, sums_name) = build_asset_names(&version, &self.conf.platform);
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(assets = ?[&file_name, &sums_name], "searching release assets");
        }

        let options = self.request_options();
        let file_names = [file_name.as_str(), sums_name.as_str()];
        let asset_urls = match settings.install_mode {
            InstallMode::Direct => {
                let base_url = release_base_url(&settings.remote_url, Some(tag.as_str()))?;

                html::build_asset_urls(&base_url, &file_names)?
            }
            InstallMode::Html => {
                let base_url = release_base_url(&settings.remote_url, Some(tag.as_str()))?;

                html::find_asset_urls(&self.conf.client, cancel, &base_url, &file_names, &options)
                    .await?
            }
            InstallMode::Api => {
                github::asset_download_urls(
                    &self.conf.client,
                    cancel,
                    &tag,
                    &file_names,
                    &settings.remote_url,
                    &self.api_request_options(),
                )
                .await?
            }
        };
        let asset_urls = download::apply_url_rewrite(settings.rewrite_rule.as_ref(), asset_urls)?;

        let data = download::bytes(
            &self.conf.client,
            cancel,
            &asset_urls[0],
            checksum::no_check,
            &options,
        )
        .await?;
        let sums_data = download::bytes(
            &self.conf.client,
            cancel,
            &asset_urls[1],
            checksum::no_check,
            &options,
        )
        .await?;

        // nothing reaches the target directory before the digest matches
        checksum::check(&data, &sums_data, &file_name)?;

        fs::create_dir_all(target_path)?;
        let binary_path = target_path.join(self.conf.platform.binary_name(ATMOS_TOOL_NAME));
        fs::write(&binary_path, &data)?;
        set_executable(&binary_path)?;

        tracing::info!(version = %version, path = %binary_path.display(), "installed atmos");

        Ok(())
    }

    async fn list_versions(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let settings = self.conf.atmos.init_remote_conf(&self.conf.getenv)?;
        let options = self.request_options();

        match settings.list_mode {
            ListMode::Html => {
                let base_url = release_base_url(&settings.list_url, None)?;
                tracing::info!(url = %base_url, "fetching all releases");

                html::list_releases(&self.conf.client, cancel, &base_url, &options).await
            }
            ListMode::Api => {
                tracing::info!(url = %settings.list_url, "fetching all releases");

                github::list_releases(
                    &self.conf.client,
                    cancel,
                    &settings.list_url,
                    &self.api_request_options(),
                )
                .await
            }
        }
    }
}

/// Canonical atmos release path under a configured base, optionally scoped
/// to a tag.
fn release_base_url(base: &str, tag: Option<&str>) -> Result<String> {
    let mut segments = vec![
        CLOUDPOSSE_ORG,
        ATMOS_TOOL_NAME,
        github::RELEASES,
        github::DOWNLOAD,
    ];
    if let Some(tag) = tag {
        segments.push(tag);
    }

    download::join_url(base, &segments)
}

/// Bare version number with the tag marker stripped. Also the directory
/// key for an installation, so asset names and install paths cannot
/// disagree about what a version is called.
pub fn bare_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Derive the (tag, bare version) pair from either input form.
fn normalize_version(version: &str) -> (String, String) {
    let bare = bare_version(version);
    (format!("v{bare}"), bare.to_string())
}

/// Build the (binary, checksum manifest) asset names for a bare version on
/// a platform. Both derive from the same tuple so the verifier always finds
/// the matching manifest line.
fn build_asset_names(version: &str, platform: &Platform) -> (String, String) {
    let mut name = String::from(ATMOS_BASE_FILE_NAME);
    name.push_str(version);
    name.push('_');
    let sums_name = format!("{name}SHA256SUMS");

    name.push_str(platform.os_name());
    name.push('_');
    name.push_str(&platform.arch);
    let _ = platform.write_suffix_to(&mut name);

    (name, sums_name)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
