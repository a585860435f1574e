use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdpack",
    about = "Incremental metadata packager: bundle changed sources into a deployable archive",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file holding a `forceDeveloperConfig` object
    #[arg(long, global = true, default_value = "package.json")]
    pub config: PathBuf,

    /// Target API version
    #[arg(long, global = true)]
    pub api_version: Option<u32>,

    /// Project directory to package
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Output directory (fingerprints and staging tree)
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Archive destination
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,

    /// Abandon the invocation after this many seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Remove the output directory and every fingerprint
    Reset,
    /// Detect changes and assemble the staging tree
    Package(PackageArgs),
    /// Archive the staging tree
    Zip,
    /// Record the last detection as the new baseline
    Commit,
    /// Write the configured placeholder static resources
    MockResources,
    /// Package, archive and optionally commit in one step
    Run(RunArgs),
}

#[derive(Args)]
pub struct PackageArgs {
    /// Package every artifact, not only changed ones
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct RunArgs {
    #[arg(long)]
    pub all: bool,
    /// Commit fingerprints once the archive is written
    #[arg(long)]
    pub commit: bool,
}
