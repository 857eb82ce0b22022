//! # iacenv
//!
//! A version manager for infrastructure-as-code command-line tools.
//!
//! ## Overview
//!
//! `iacenv` installs and manages multiple versions of upstream IaC binaries
//! side by side. For each supported tool it discovers available release
//! versions, downloads the platform-specific binary, verifies it against the
//! published SHA-256 manifest, installs it into a per-version directory, and
//! records when each installed version was last used.
//!
//! ## Retrieval modes
//!
//! Upstream projects distribute releases in different ways, so URL
//! resolution is pluggable per tool and per operation:
//!
//! - **direct**: join a configured base URL with the canonical release path
//! - **api**: query a GitHub-compatible releases API
//! - **html** (listing only): scrape a browsable directory index
//!
//! Install and list modes are configured independently, since an upstream
//! may publish a browsable index for listing while requiring the canonical
//! per-release path for downloads.
//!
//! ## Usage
//!
//! ```bash
//! # Install a specific version
//! iacenv install atmos 1.88.0
//!
//! # List versions available upstream
//! iacenv list atmos
//!
//! # Run an installed version
//! iacenv exec atmos 1.88.0 terraform plan
//!
//! # Show installed versions and when they were last used
//! iacenv installed atmos
//! ```
//!
//! ## Configuration
//!
//! Remote endpoints, retrieval modes and mirror rewrites are configured per
//! tool in `iacenv.toml` under the user config directory, with
//! `IACENV_<TOOL>_*` environment variables taking precedence.

/// SHA-256 manifest verification
pub mod checksum;

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Remote configuration, retrieval modes, and environment access
pub mod config;

/// Byte-level downloads with authentication, cancellation, and URL rewriting
pub mod download;

/// Error types and the crate-wide Result alias
pub mod error;

/// GitHub-compatible releases API collaborator
pub mod github;

/// HTML directory-index collaborator for asset lookup and version listing
pub mod html;

/// Per-installation last-use tracking
pub mod lastuse;

/// Platform-specific naming of binaries and archives
pub mod platform;

/// Per-tool orchestration of discovery, download, verification, and install
pub mod retriever;
