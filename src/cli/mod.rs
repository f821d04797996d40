//! CLI argument parsing for sprig.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sprig: template-based microservice scaffolding composer.
///
/// A new service is composed from a cloned template repository:
/// placeholder tokens are substituted, placeholder-named paths renamed,
/// add-on fragments merged at fixed anchors, and a container-backed smoke
/// test generated for the selected infrastructure.
#[derive(Parser, Debug)]
#[command(name = "sprig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for sprig.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose a new service from the template.
    ///
    /// Validates the configuration, clones the template repository,
    /// composes the tree, and optionally initializes git and publishes
    /// the repository.
    New(NewArgs),

    /// List the available add-ons.
    Addons,

    /// Check that the external tools sprig relies on are installed.
    ///
    /// Reports required and optional tools with remediation hints.
    Doctor(DoctorArgs),
}

/// Arguments for the `new` command.
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Name of the new service (lowercase, '-service' suffix).
    pub name: String,

    /// Business domain of the service, a single lowercase word.
    #[arg(long)]
    pub domain: String,

    /// Port the service listens on (1024-65535, must be unregistered).
    #[arg(long)]
    pub port: u32,

    /// Database name, required when the postgresql add-on is enabled.
    #[arg(long)]
    pub database: Option<String>,

    /// Add-ons to enable (comma-separated, see `sprig addons`).
    #[arg(long, value_delimiter = ',')]
    pub addons: Vec<String>,

    /// Parent directory for the generated service. Defaults to the
    /// current directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Template repository (git URL or local path). Overrides the config.
    #[arg(long)]
    pub template: Option<String>,

    /// Path to the sprig config file.
    #[arg(long, default_value = "sprig.yaml")]
    pub config: PathBuf,

    /// Java toolchain version. Overrides the config default.
    #[arg(long)]
    pub java_version: Option<String>,

    /// Shared commons library version. Overrides the config default.
    #[arg(long)]
    pub commons_version: Option<String>,

    /// Create a remote repository with gh and push the initial commit.
    #[arg(long)]
    pub github: bool,

    /// Skip git init and the initial commit.
    #[arg(long)]
    pub no_git: bool,
}

/// Arguments for the `doctor` command.
#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Emit the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
