use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "iacenv",
    version,
    about = "Version manager for infrastructure-as-code CLI tools",
    long_about = None
)]
pub struct Cli {
    /// Root directory holding per-tool, per-version installations
    #[clap(long, env = "IACENV_ROOT")]
    pub root: Option<PathBuf>,

    /// Configuration file path
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download, verify and install a specific version of a tool
    Install {
        /// Tool name (e.g. atmos)
        tool: String,
        /// Version to install, with or without the leading 'v'
        version: String,
    },

    /// List versions available upstream
    List {
        /// Tool name (e.g. atmos)
        tool: String,
    },

    /// List installed versions with their last-use dates
    Installed {
        /// Tool name (e.g. atmos)
        tool: String,
    },

    /// Run an installed version, recording its use
    Exec {
        /// Tool name (e.g. atmos)
        tool: String,
        /// Installed version to run
        version: String,
        /// Arguments passed through to the tool
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}
