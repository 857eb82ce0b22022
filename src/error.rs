use thiserror::Error;

#[derive(Error, Debug)]
pub enum IacEnvError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("URL '{url}' cannot be used as a base for path segments")]
    UrlNotABase { url: String },

    #[error("Remote configuration for {tool} is not initialized, call init_remote_conf first")]
    RemoteConfNotInitialized { tool: String },

    #[error("Unsupported install mode '{0}'. Recognized modes: direct, html, api")]
    InstallMode(String),

    #[error("Unsupported list mode '{0}'. Recognized modes: html, api")]
    ListMode(String),

    #[error("Invalid rewrite rule for {tool}: expected [prefix, replacement] pair")]
    InvalidRewriteRule { tool: String },

    #[error("Invalid boolean value '{value}' in environment variable {name}")]
    InvalidEnvValue { name: String, value: String },

    #[error("No checksum found for {file_name} in manifest")]
    ChecksumMissing { file_name: String },

    #[error("Checksum mismatch for {file_name}: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        file_name: String,
        expected: String,
        computed: String,
    },

    #[error("Download of {url} failed with HTTP status {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Configuration error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("Download of {url} was cancelled")]
    Cancelled { url: String },

    #[error("Asset {file_name} not found at {url}")]
    AssetNotFound { file_name: String, url: String },

    #[error("Unknown tool '{tool}'. Supported tools: atmos")]
    UnknownTool { tool: String },

    #[error("Version {version} of {tool} is not installed at {path}")]
    VersionNotInstalled {
        tool: String,
        version: String,
        path: String,
    },
}

pub type Result<T> = std::result::Result<T, IacEnvError>;
