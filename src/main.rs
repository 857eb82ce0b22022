use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use iacenv::cli::{Cli, Command};
use iacenv::config::{Config, Getenv};
use iacenv::error::IacEnvError;
use iacenv::lastuse;
use iacenv::platform::Platform;
use iacenv::retriever::{bare_version, retriever_for};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Running iacenv with verbose output");
    }

    let conf = Config::load(
        cli.config.as_deref(),
        cli.root.clone(),
        Platform::current(),
        Getenv::new(),
    )?;

    // Ctrl-C aborts any in-flight transfer
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    match cli.command {
        Command::Install { tool, version } => {
            let retriever = retriever_for(&tool, &conf)?;
            let target_path = conf.install_dir(&tool, bare_version(&version));
            retriever.install(&cancel, &version, &target_path).await?;
        }
        Command::List { tool } => {
            let retriever = retriever_for(&tool, &conf)?;
            for version in retriever.list_versions(&cancel).await? {
                println!("{version}");
            }
        }
        Command::Installed { tool } => {
            for (version, last_use) in installed_versions(&conf, &tool)? {
                match last_use {
                    Some(date) => println!("{version}\t(last used {date})"),
                    None => println!("{version}\t(never used)"),
                }
            }
        }
        Command::Exec {
            tool,
            version,
            args,
        } => {
            let install_dir = conf.install_dir(&tool, bare_version(&version));
            let binary_path = install_dir.join(conf.platform.binary_name(&tool));
            if !binary_path.is_file() {
                return Err(IacEnvError::VersionNotInstalled {
                    tool,
                    version,
                    path: install_dir.display().to_string(),
                }
                .into());
            }

            lastuse::write_now(&install_dir, &conf.getenv);

            let status = std::process::Command::new(&binary_path)
                .args(&args)
                .status()?;
            std::process::exit(status.code().unwrap_or(1));
        }
    }

    Ok(())
}

/// Installed versions of a tool with their last-use dates, sorted by
/// directory name.
fn installed_versions(
    conf: &Config,
    tool: &str,
) -> Result<Vec<(String, Option<chrono::NaiveDate>)>> {
    let tool_dir = conf.root_dir.join(tool);
    let entries = match std::fs::read_dir(&tool_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let version = entry.file_name().to_string_lossy().into_owned();
        let last_use = lastuse::read(&entry.path());
        versions.push((version, last_use));
    }
    versions.sort();

    Ok(versions)
}
