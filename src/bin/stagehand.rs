// src/bin/stagehand.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use stagehand::cli::{Cli, handlers};

// --- Command Definition and Registry ---

/// Defines a system command, its aliases, and its synchronous handler function.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[CommandDefinition {
    name: "deploy",
    aliases: &[],
    handler: handlers::deploy::handle,
}];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// The main entry point of `stagehand`.
/// It loads `./.env`, sets up logging, parses arguments, dispatches to the handler,
/// and performs centralized error handling.
fn main() {
    // Variables already set in the environment win over the file.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("{}: could not load .env: {}", "Warning".yellow().bold(), e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(action) = cli.action else {
        return Err(anyhow!(
            "No command given. Try `stagehand deploy --help`."
        ));
    };

    match find_command(&action) {
        Some(command) => (command.handler)(cli.args),
        None => Err(anyhow!(
            "Unknown command '{}'. Available: {}",
            action,
            COMMAND_REGISTRY
                .iter()
                .map(|cmd| cmd.name)
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}
