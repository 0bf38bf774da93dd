// src/cli/args.rs
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // The action name has already been consumed by the dispatcher.
#[command(name = "stagehand deploy")]
pub struct DeployArgs {
    /// The project to deploy. If omitted, it is detected from the git remote.
    #[arg(long, short)]
    pub project: Option<String>,

    /// The project's framework (`nestjs`, `expressjs`). Unknown names run no build steps.
    #[arg(long, short)]
    pub framework: Option<String>,

    /// Open the interactive task menu instead of running the scripted steps.
    #[arg(long, conflicts_with = "yes")]
    pub ask: bool,

    /// Run the scripted steps without asking anything.
    #[arg(long, short)]
    pub yes: bool,

    /// Ask Gemini for a short summary of the deployment (needs GEMINI_API_KEY).
    #[arg(long)]
    pub ai: bool,

    /// Set a variable in the remote .env before building (e.g., "KEY=VALUE"). Repeatable.
    #[arg(long, value_name = "KEY=VALUE")]
    pub env: Vec<String>,
}

impl DeployArgs {
    /// `--ask` and `--yes` win over the configured default.
    pub fn interactive(&self, configured_default: bool) -> bool {
        if self.ask {
            true
        } else if self.yes {
            false
        } else {
            configured_default
        }
    }
}
