//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Toolforge - Verified installer for Kubernetes and OpenShift tooling
#[derive(Parser, Debug)]
#[command(name = "toolforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install or update the managed tools
    Install(InstallArgs),

    /// Show the tool catalog and what is currently installed
    List(ListArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Restrict the run to these tools (default: all)
    pub tools: Vec<String>,

    /// Pin a tool to an exact version (repeatable, e.g. --pin kubectl=1.30.0)
    #[arg(long, value_name = "TOOL=VERSION")]
    pub pin: Vec<String>,

    /// Destination directory for installed binaries
    #[arg(short, long, default_value_os_t = default_dest())]
    pub dest: PathBuf,

    /// Reinstall even when the installed version already matches
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Destination directory to inspect
    #[arg(short, long, default_value_os_t = default_dest())]
    pub dest: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn default_dest() -> PathBuf {
    toolforge_core::InstallerConfig::default_dest_dir()
}
