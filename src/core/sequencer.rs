// src/core/sequencer.rs

//! # Deployment Sequencer
//!
//! Drives one deployment from start to finish:
//!
//! `ResolveProject -> ValidateProject -> ValidateEnvAssignments -> LoadCredentials ->
//! Connect -> Pull -> [EnvAssignments] -> InteractiveLoop | ScriptedFrameworkTasks ->
//! RestartSupervisor -> [AiSummary] -> Teardown`
//!
//! Everything before `Connect` is local and fails the run without touching the
//! network. From `Connect` on, the session is held by a scope guard so `Teardown`
//! happens on every exit path, including `?` returns.
//!
//! Failure policy per step:
//! - `Pull` and `RestartSupervisor`: a non-zero status is reported and the run continues.
//! - Scripted framework steps: a non-zero status aborts the run (`StepFailed`).
//! - Interactive actions: a non-zero status is reported and the menu comes back.
//! - `AiSummary`: every failure is logged and swallowed.
//! - A session-level `RemoteError` anywhere aborts the run.

use crate::constants::SUMMARY_COMMIT_COUNT;
use crate::core::command::ShellCommand;
use crate::core::env_file::{self, EnvFileError, EnvUpdate};
use crate::core::error::DeployError;
use crate::core::repo_map::RepoMapping;
use crate::core::settings::Settings;
use crate::core::summary::{self, Summarizer};
use crate::core::validation::{is_valid_env_key, is_valid_env_value};
use crate::core::{frameworks, git_remote, runner};
use crate::dev_utils::StepTimer;
use crate::models::{
    DeployReport, DeploymentRequest, Framework, ProjectIdentity, StepRecord, TaskAction,
};
use crate::system::remote::{CommandResult, Connector, RemoteShell};
use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

/// Asks the user things during the interactive loop.
pub trait Prompter {
    /// Returns the index of the chosen item.
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize, DeployError>;

    /// Reads one line of free text. An empty answer is allowed.
    fn input(&mut self, prompt: &str) -> Result<String, DeployError>;
}

/// Finds the project name when none was given explicitly.
pub trait ProjectDetector {
    /// `Ok(None)` when nothing could be detected.
    fn detect(&self) -> Result<Option<String>, DeployError>;
}

/// Maps the local repository's `origin` remote through the repo map file.
#[derive(Debug, Clone)]
pub struct GitRemoteDetector {
    /// Any directory inside the local checkout.
    pub workdir: PathBuf,
    /// `None` when no repo map location could be determined.
    pub repo_map_path: Option<PathBuf>,
}

impl ProjectDetector for GitRemoteDetector {
    fn detect(&self) -> Result<Option<String>, DeployError> {
        let Some(slug) = git_remote::resolve_repo_slug(&self.workdir) else {
            return Ok(None);
        };
        let Some(path) = &self.repo_map_path else {
            log::debug!("No repo map location available; cannot map '{}'", slug);
            return Ok(None);
        };
        let mapping = RepoMapping::load(path)?;
        let project = mapping.lookup(&slug).map(str::to_string);
        match &project {
            Some(name) => log::info!("Repository '{}' maps to project '{}'", slug, name),
            None => log::info!("Repository '{}' is not in '{}'", slug, path.display()),
        }
        Ok(project)
    }
}

/// Runs one deployment over a session opened by `C`.
///
/// The sequencer owns the session it opens and closes it before `run` returns.
pub struct Sequencer<'a, C: Connector> {
    connector: &'a C,
    settings: &'a Settings,
    detector: &'a dyn ProjectDetector,
    prompter: &'a mut dyn Prompter,
    summarizer: Option<&'a dyn Summarizer>,
}

impl<C: Connector> fmt::Debug for Sequencer<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("base_dir", &self.settings.base_dir)
            .field("summarizer", &self.summarizer.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, C: Connector> Sequencer<'a, C> {
    /// A missing `summarizer` makes `--ai` a warning instead of a summary.
    pub fn new(
        connector: &'a C,
        settings: &'a Settings,
        detector: &'a dyn ProjectDetector,
        prompter: &'a mut dyn Prompter,
        summarizer: Option<&'a dyn Summarizer>,
    ) -> Self {
        Self {
            connector,
            settings,
            detector,
            prompter,
            summarizer,
        }
    }

    /// Runs the whole deployment and returns what each remote step did.
    pub fn run(&mut self, request: &DeploymentRequest) -> Result<DeployReport, DeployError> {
        // --- 1. Local preconditions: nothing below touches the network. ---
        let raw_name = resolve_project_name(request, self.detector)?;
        let project = ProjectIdentity::new(&raw_name)?;
        validate_env_assignments(request)?;
        let credentials = self.settings.credentials()?;

        let framework = request.framework.as_deref().and_then(Framework::parse);
        if let (Some(name), None) = (&request.framework, framework) {
            println!(
                "{}",
                format!("Unrecognized framework '{}': no build steps will run.", name).yellow()
            );
        }

        // --- 2. Connect, with teardown guaranteed from here on. ---
        println!(
            "{} {} ({})",
            "Connecting to".green(),
            credentials.destination().cyan(),
            credentials.key_path.display()
        );
        let session = {
            let _timer = StepTimer::new("connect");
            self.connector.connect(&credentials)?
        };
        let mut session = scopeguard::guard(session, |mut session| {
            log::debug!("Tearing down remote session");
            session.close();
        });
        let session: &mut dyn RemoteShell = &mut *session;

        let remote_dir = project.remote_dir(&self.settings.base_dir);
        let mut report = DeployReport {
            project: project.to_string(),
            framework: framework.map(|f| f.name().to_string()),
            ..Default::default()
        };

        // --- 3. Pull (lenient). ---
        let pull = run_step(
            session,
            &mut report,
            "Pull latest code",
            &ShellCommand::new("git").flag("pull"),
            &remote_dir,
        )?;
        if !pull.success() {
            println!(
                "    {}",
                "Pull failed; continuing with the code already on the server.".yellow()
            );
        }

        // --- 4. Env assignments given on the command line. ---
        for assignment in &request.env_assignments {
            apply_env_assignment(
                session,
                &mut report,
                &remote_dir,
                &assignment.key,
                &assignment.value,
            )?;
        }

        // --- 5. Framework tasks. ---
        if request.interactive {
            self.interactive_loop(session, &mut report, framework, &remote_dir)?;
        } else {
            run_scripted_tasks(session, &mut report, framework, &remote_dir)?;
        }

        // --- 6. Restart the supervisor entry (lenient). ---
        let restart = restart_command(&project, &self.settings.fallback_target);
        let restarted = run_step(session, &mut report, "Restart process", &restart, &remote_dir)?;
        if !restarted.success() {
            println!(
                "    {}",
                "Neither the project nor the fallback supervisor entry could be restarted."
                    .yellow()
            );
        }

        // --- 7. Optional AI summary (never fails the run). ---
        if request.ai_enabled {
            report.summary = self.summarize(session, &report, &remote_dir);
        }

        Ok(report)
    }

    fn interactive_loop(
        &mut self,
        session: &mut dyn RemoteShell,
        report: &mut DeployReport,
        framework: Option<Framework>,
        remote_dir: &str,
    ) -> Result<(), DeployError> {
        let actions = frameworks::menu_actions(framework);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        loop {
            let choice = self.prompter.select("What would you like to do?", &labels)?;
            let action = actions
                .get(choice)
                .copied()
                .ok_or_else(|| DeployError::Prompt(format!("no menu entry #{}", choice)))?;

            match action {
                TaskAction::Continue => return Ok(()),
                TaskAction::UpdateEnvVar => self.prompt_env_update(session, report, remote_dir)?,
                build_action => {
                    if let Some(command) = frameworks::command_for(build_action) {
                        let result =
                            run_step(session, report, build_action.label(), &command, remote_dir)?;
                        if !result.success() {
                            println!(
                                "    {}",
                                "Step failed. Pick another action, retry, or continue.".yellow()
                            );
                        }
                    }
                }
            }
        }
    }

    /// Asks for a key and value and writes them. Bad input is reported, not fatal.
    fn prompt_env_update(
        &mut self,
        session: &mut dyn RemoteShell,
        report: &mut DeployReport,
        remote_dir: &str,
    ) -> Result<(), DeployError> {
        let key = self.prompter.input("Variable name")?;
        let key = key.trim().to_string();
        if !is_valid_env_key(&key) {
            println!("{}", DeployError::InvalidKey(key).to_string().red());
            return Ok(());
        }
        let value = self.prompter.input(&format!("Value for {}", key))?;
        if !is_valid_env_value(&value) {
            println!("{}", DeployError::InvalidValue(key).to_string().red());
            return Ok(());
        }

        match apply_env_assignment(session, report, remote_dir, &key, &value) {
            Ok(()) => Ok(()),
            Err(DeployError::RemoteExecution(e)) => Err(DeployError::RemoteExecution(e)),
            Err(other) => {
                println!("    {}", other.to_string().red());
                Ok(())
            }
        }
    }

    fn summarize(
        &self,
        session: &mut dyn RemoteShell,
        report: &DeployReport,
        remote_dir: &str,
    ) -> Option<String> {
        let Some(summarizer) = self.summarizer else {
            log::warn!("--ai requested but GEMINI_API_KEY is not set; skipping the summary");
            println!("{}", "AI summary skipped: GEMINI_API_KEY is not set.".yellow());
            return None;
        };
        let _timer = StepTimer::new("ai summary");

        let log_cmd = ShellCommand::new("git")
            .flag("log")
            .flag("-n")
            .arg(SUMMARY_COMMIT_COUNT.to_string())
            .flag("--oneline");
        let commits = match runner::run(session, &log_cmd, Some(remote_dir)) {
            Ok(result) if result.success() => result.stdout,
            Ok(_) => String::new(),
            Err(e) => {
                log::warn!("Could not read recent commits for the summary: {}", e);
                String::new()
            }
        };

        println!("\n{} {}", "==>".cyan().bold(), "Generating AI summary".bold());
        match summarizer.summarize(&summary::build_prompt(report, &commits)) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("AI summary failed: {}", e);
                println!("    {}", format!("AI summary unavailable: {}", e).yellow());
                None
            }
        }
    }
}

/// Explicit name first; otherwise ask the detector. Neither is fatal.
fn resolve_project_name(
    request: &DeploymentRequest,
    detector: &dyn ProjectDetector,
) -> Result<String, DeployError> {
    let explicit = request.project.trim();
    if !explicit.is_empty() {
        return Ok(explicit.to_string());
    }
    detector.detect()?.ok_or(DeployError::UnresolvedProject)
}

/// `pm2 restart <project> || pm2 restart <fallback>`
fn restart_command(project: &ProjectIdentity, fallback_target: &str) -> ShellCommand {
    ShellCommand::new("pm2")
        .flag("restart")
        .arg(project.as_str())
        .or_else(ShellCommand::new("pm2").flag("restart").arg(fallback_target))
}

/// Rejects bad `--env` keys and values before anything connects.
fn validate_env_assignments(request: &DeploymentRequest) -> Result<(), DeployError> {
    for assignment in &request.env_assignments {
        if !is_valid_env_key(&assignment.key) {
            return Err(DeployError::InvalidKey(assignment.key.clone()));
        }
        if !is_valid_env_value(&assignment.value) {
            return Err(DeployError::InvalidValue(assignment.key.clone()));
        }
    }
    Ok(())
}

fn run_scripted_tasks(
    session: &mut dyn RemoteShell,
    report: &mut DeployReport,
    framework: Option<Framework>,
    remote_dir: &str,
) -> Result<(), DeployError> {
    for &action in frameworks::scripted_steps(framework) {
        let Some(command) = frameworks::command_for(action) else {
            continue;
        };
        let result = run_step(session, report, action.label(), &command, remote_dir)?;
        if !result.success() {
            return Err(DeployError::StepFailed {
                step: action.label().to_string(),
                status: result.exit_status,
            });
        }
    }
    Ok(())
}

fn apply_env_assignment(
    session: &mut dyn RemoteShell,
    report: &mut DeployReport,
    remote_dir: &str,
    key: &str,
    value: &str,
) -> Result<(), DeployError> {
    println!("\n{} Set {} in .env", "==>".cyan().bold(), key.bold());
    let update = env_file::set_env_var(session, remote_dir, key, value);
    // Values may be secrets, so the report only names the key.
    let (exit_status, outcome) = match &update {
        Ok(EnvUpdate::Replaced) => (0, "replaced"),
        Ok(EnvUpdate::Appended) => (0, "added"),
        Err(EnvFileError::StepFailed { status, .. }) => (*status, "failed"),
        Err(_) => (-1, "failed"),
    };
    report.steps.push(StepRecord {
        label: format!("Set {}", key),
        command: format!("update {} in .env", key),
        exit_status,
    });
    update?;
    println!("    {}", outcome.green());
    Ok(())
}

/// Runs one deployment step in `remote_dir`, printing and recording its outcome.
fn run_step(
    session: &mut dyn RemoteShell,
    report: &mut DeployReport,
    label: &str,
    command: &ShellCommand,
    remote_dir: &str,
) -> Result<CommandResult, DeployError> {
    let _timer = StepTimer::new(label);
    println!("\n{} {}", "==>".cyan().bold(), label.bold());
    println!("    {}", command.as_str().dimmed());

    let result = runner::run(session, command, Some(remote_dir))?;
    report.steps.push(StepRecord {
        label: label.to_string(),
        command: command.to_string(),
        exit_status: result.exit_status,
    });

    if result.success() {
        println!("    {}", "done".green());
    } else {
        log::warn!("'{}' exited with status {}", label, result.exit_status);
        println!(
            "    {}",
            format!("exit status {}", result.exit_status).yellow()
        );
        let stderr: Vec<&str> = result.stderr.trim().lines().collect();
        for line in stderr.iter().skip(stderr.len().saturating_sub(5)) {
            println!("    {}", line.dimmed());
        }
    }
    Ok(result)
}
