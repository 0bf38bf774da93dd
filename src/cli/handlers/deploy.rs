// src/cli/handlers/deploy.rs

use anyhow::Result;
use clap::{Parser, error::ErrorKind};
use colored::Colorize;
use std::env;

use super::commons::{self, DialoguerPrompter};
use crate::{
    cli::args::DeployArgs,
    core::{
        sequencer::{GitRemoteDetector, Sequencer},
        settings::Settings,
        summary::{GeminiSummarizer, Summarizer},
    },
    models::{DeploymentRequest, EnvAssignment},
    system::ssh::SshConnector,
};

/// The main handler for the `deploy` command.
/// Pulls, builds and restarts a project on the staging host.
pub fn handle(args: Vec<String>) -> Result<()> {
    // 1. Parse arguments
    let deploy_args = match DeployArgs::try_parse_from(&args) {
        Ok(parsed) => parsed,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Resolve configuration (env, then config file, then defaults)
    let settings = Settings::load()?;

    // 3. Build the request. `--env` pairs are validated here, before anything connects.
    let env_assignments = deploy_args
        .env
        .iter()
        .map(|raw| EnvAssignment::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let request = DeploymentRequest {
        project: deploy_args.project.clone().unwrap_or_default(),
        framework: deploy_args.framework.clone(),
        interactive: deploy_args.interactive(settings.interactive_default),
        ai_enabled: deploy_args.ai,
        env_assignments,
    };
    log::debug!("Deployment request: {:?}", request);

    // 4. Wire the collaborators
    let detector = GitRemoteDetector {
        workdir: env::current_dir()?,
        repo_map_path: settings.repo_map_path.clone(),
    };
    let connector = SshConnector;
    let mut prompter = DialoguerPrompter;

    let gemini = if request.ai_enabled {
        match GeminiSummarizer::from_settings(&settings) {
            Some(Ok(client)) => Some(client),
            Some(Err(e)) => {
                log::warn!("Could not set up the AI client: {}", e);
                None
            }
            None => None,
        }
    } else {
        None
    };
    let summarizer = gemini.as_ref().map(|client| client as &dyn Summarizer);

    // 5. Run
    let report =
        Sequencer::new(&connector, &settings, &detector, &mut prompter, summarizer).run(&request)?;

    commons::print_report(&report);
    println!(
        "\n{} '{}' deployed.",
        "Success:".green().bold(),
        report.project.cyan()
    );
    Ok(())
}
