use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::download::RequestOptions;
use crate::error::{IacEnvError, Result};
use crate::platform::Platform;

pub const ROOT_ENV: &str = "IACENV_ROOT";
pub const GITHUB_TOKEN_ENV: &str = "IACENV_GITHUB_TOKEN";
pub const SKIP_LAST_USE_ENV: &str = "IACENV_SKIP_LAST_USE";

pub const ATMOS_TOOL_NAME: &str = "atmos";

/// Strategy used to locate download URLs for a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// Concatenate a configured base URL with the canonical release path.
    Direct,
    /// Scrape a browsable release index for links matching the expected
    /// asset names.
    Html,
    /// Query a GitHub-compatible releases API for asset URLs.
    Api,
}

impl FromStr for InstallMode {
    type Err = IacEnvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct" => Ok(InstallMode::Direct),
            "html" => Ok(InstallMode::Html),
            "api" => Ok(InstallMode::Api),
            other => Err(IacEnvError::InstallMode(other.to_string())),
        }
    }
}

/// Strategy used to enumerate all available versions for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Scrape a browsable HTML index.
    Html,
    /// Query a GitHub-compatible releases API.
    Api,
}

impl FromStr for ListMode {
    type Err = IacEnvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "html" => Ok(ListMode::Html),
            "api" => Ok(ListMode::Api),
            other => Err(IacEnvError::ListMode(other.to_string())),
        }
    }
}

/// Typed getter over the process environment.
///
/// Tests inject an isolated variable map so configuration resolution never
/// depends on the real environment.
#[derive(Debug, Clone, Default)]
pub struct Getenv {
    overrides: HashMap<String, String>,
    isolated: bool,
}

impl Getenv {
    pub fn new() -> Self {
        Self::default()
    }

    /// A getter that only sees `vars`, never the process environment.
    pub fn isolated(vars: HashMap<String, String>) -> Self {
        Self {
            overrides: vars,
            isolated: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(name) {
            return Some(value.clone());
        }
        if self.isolated {
            return None;
        }

        std::env::var(name).ok()
    }

    /// Parse a boolean variable; unset or empty yields `default`.
    pub fn bool(&self, default: bool, name: &str) -> Result<bool> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        if value.is_empty() {
            return Ok(default);
        }

        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(IacEnvError::InvalidEnvValue {
                name: name.to_string(),
                value,
            }),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    tools: HashMap<String, ToolFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct ToolFileConfig {
    remote_url: Option<String>,
    list_url: Option<String>,
    install_mode: Option<String>,
    list_mode: Option<String>,
    rewrite: Option<Vec<String>>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|err| IacEnvError::Config {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

/// Built-in remote settings a tool falls back to when neither the
/// environment nor the configuration file overrides them.
#[derive(Debug, Clone)]
pub struct RemoteDefaults {
    pub remote_url: &'static str,
    pub list_url: &'static str,
    pub install_mode: InstallMode,
    pub list_mode: ListMode,
}

const ATMOS_DEFAULTS: RemoteDefaults = RemoteDefaults {
    remote_url: "https://api.github.com/repos/cloudposse/atmos",
    list_url: "https://api.github.com/repos/cloudposse/atmos",
    install_mode: InstallMode::Api,
    list_mode: ListMode::Api,
};

/// Remote settings resolved once per tool.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub install_mode: InstallMode,
    pub list_mode: ListMode,
    pub remote_url: String,
    pub list_url: String,
    pub rewrite_rule: Option<(String, String)>,
}

/// Per-tool remote configuration with environment > file > default
/// precedence, resolved lazily and exactly once.
#[derive(Debug)]
pub struct RemoteConfig {
    tool: String,
    defaults: RemoteDefaults,
    file: ToolFileConfig,
    resolved: OnceCell<RemoteSettings>,
}

impl RemoteConfig {
    fn new(tool: &str, defaults: RemoteDefaults, file: ToolFileConfig) -> Self {
        Self {
            tool: tool.to_string(),
            defaults,
            file,
            resolved: OnceCell::new(),
        }
    }

    /// Resolve the remote settings. Idempotent; mode strings that name no
    /// recognized variant fail here, before any network or filesystem side
    /// effect.
    pub fn init_remote_conf(&self, getenv: &Getenv) -> Result<&RemoteSettings> {
        self.resolved.get_or_try_init(|| {
            let install_mode = match self.setting(getenv, "INSTALL_MODE", &self.file.install_mode) {
                Some(mode) => mode.parse()?,
                None => self.defaults.install_mode,
            };
            let list_mode = match self.setting(getenv, "LIST_MODE", &self.file.list_mode) {
                Some(mode) => mode.parse()?,
                None => self.defaults.list_mode,
            };
            let remote_url = self
                .setting(getenv, "REMOTE_URL", &self.file.remote_url)
                .unwrap_or_else(|| self.defaults.remote_url.to_string());
            let list_url = self
                .setting(getenv, "LIST_URL", &self.file.list_url)
                .unwrap_or_else(|| self.defaults.list_url.to_string());

            let rewrite_rule = match &self.file.rewrite {
                None => None,
                Some(pair) if pair.len() == 2 => Some((pair[0].clone(), pair[1].clone())),
                Some(_) => {
                    return Err(IacEnvError::InvalidRewriteRule {
                        tool: self.tool.clone(),
                    })
                }
            };

            Ok(RemoteSettings {
                install_mode,
                list_mode,
                remote_url,
                list_url,
                rewrite_rule,
            })
        })
    }

    /// Resolved settings; fails if `init_remote_conf` has not run.
    pub fn settings(&self) -> Result<&RemoteSettings> {
        self.resolved
            .get()
            .ok_or_else(|| IacEnvError::RemoteConfNotInitialized {
                tool: self.tool.clone(),
            })
    }

    fn setting(&self, getenv: &Getenv, suffix: &str, file_value: &Option<String>) -> Option<String> {
        getenv
            .get(&env_key(&self.tool, suffix))
            .or_else(|| file_value.clone())
    }
}

fn env_key(tool: &str, suffix: &str) -> String {
    format!("IACENV_{}_{suffix}", tool.to_uppercase())
}

/// Shared configuration handed to every retriever.
#[derive(Debug)]
pub struct Config {
    pub root_dir: PathBuf,
    pub platform: Platform,
    pub getenv: Getenv,
    pub github_token: Option<String>,
    pub client: Client,
    pub atmos: RemoteConfig,
}

impl Config {
    pub fn load(
        config_path: Option<&Path>,
        root_dir: Option<PathBuf>,
        platform: Platform,
        getenv: Getenv,
    ) -> Result<Self> {
        let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let mut file = FileConfig::load(&path)?;

        let root_dir = root_dir
            .or_else(|| getenv.get(ROOT_ENV).map(PathBuf::from))
            .unwrap_or_else(default_root_dir);

        let github_token = getenv
            .get(GITHUB_TOKEN_ENV)
            .or_else(|| getenv.get("GITHUB_TOKEN"));

        let client = Client::builder()
            .user_agent("iacenv")
            .timeout(Duration::from_secs(30))
            .build()?;

        let atmos = RemoteConfig::new(
            ATMOS_TOOL_NAME,
            ATMOS_DEFAULTS,
            file.tools.remove(ATMOS_TOOL_NAME).unwrap_or_default(),
        );

        Ok(Self {
            root_dir,
            platform,
            getenv,
            github_token,
            client,
            atmos,
        })
    }

    /// Installation directory for a (tool, version) pair; the single source
    /// of truth for durable state.
    pub fn install_dir(&self, tool: &str, version: &str) -> PathBuf {
        self.root_dir.join(tool).join(version)
    }

    /// Basic-auth credentials for a tool, resolved from the environment.
    /// Both variables must be set for credentials to apply.
    pub fn request_options(&self, tool: &str) -> RequestOptions {
        let basic_auth = match (
            self.getenv.get(&env_key(tool, "REMOTE_USER")),
            self.getenv.get(&env_key(tool, "REMOTE_PASSWORD")),
        ) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        };

        RequestOptions {
            basic_auth,
            bearer_token: None,
        }
    }
}

fn default_config_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("iacenv.toml"))
        .unwrap_or_else(|| PathBuf::from(".config/iacenv.toml"))
}

fn default_root_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".iacenv"))
        .unwrap_or_else(|| PathBuf::from(".iacenv"))
}
