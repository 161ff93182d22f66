// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Selects the environment, the pipeline action and the output mode.

use clap::Parser;
use rollout::pipeline::Action;
use rollout::types::{Environment, Version};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rollout")]
#[command(about = "Build, publish and deploy a service, rolling back when it is unhealthy")]
#[command(version)]
pub struct Cli {
    /// Target environment
    #[arg(short, long, default_value = "production")]
    pub environment: Environment,

    /// What to do
    #[arg(short, long, value_enum, default_value_t = Action::Deploy)]
    pub action: Action,

    /// Version to deploy instead of `git describe --tags --always`
    #[arg(long, value_name = "VERSION")]
    pub tag: Option<Version>,

    /// Configuration file (default: discover rollout.yml in the current directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write a rollout.yml template to the current directory and exit
    #[arg(long, conflicts_with_all = ["action", "tag", "config"])]
    pub init: bool,

    /// Namespace for the generated template (default: derived from the directory name)
    #[arg(long, requires = "init")]
    pub namespace: Option<String>,

    /// Overwrite an existing rollout.yml
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines
    #[arg(long)]
    pub json: bool,
}
