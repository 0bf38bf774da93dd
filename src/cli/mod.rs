// src/cli/mod.rs

use clap::Parser;

pub mod args;
pub mod handlers;

/// stagehand: deploys a project to a staging host over a single SSH session.
///
/// Usage:
/// - `stagehand deploy [--project <name>] [--framework <name>] [--ask | --yes] [--ai]
///   [--env KEY=VALUE]...`
///
/// Without `--project`, the project is looked up from this repository's
/// `origin` remote in the repo map file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The action to run (currently only `deploy`).
    pub action: Option<String>,

    /// Everything after the action, handed to the action's own parser.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
