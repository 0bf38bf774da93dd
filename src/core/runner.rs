// src/core/runner.rs

use crate::core::command::ShellCommand;
use crate::system::remote::{CommandResult, RemoteError, RemoteShell};

/// Longest stdout/stderr excerpt written to the debug log per command.
const LOG_EXCERPT_CHARS: usize = 2000;

/// Runs `command` on the session, optionally inside `cwd`, and logs what happened.
///
/// A non-zero exit status is returned as data. Only a session that cannot evaluate
/// the command at all produces an `Err`.
pub fn run(
    session: &mut dyn RemoteShell,
    command: &ShellCommand,
    cwd: Option<&str>,
) -> Result<CommandResult, RemoteError> {
    let line = match cwd {
        Some(dir) => command.clone().in_dir(dir),
        None => command.clone(),
    };

    log::info!("remote$ {}", line);
    let result = session.exec(line.as_str())?;

    let stdout = result.stdout.trim();
    if !stdout.is_empty() {
        log::debug!("stdout: {}", excerpt(stdout));
    }
    let stderr = result.stderr.trim();
    if !stderr.is_empty() {
        log::debug!("stderr: {}", excerpt(stderr));
    }
    if !result.success() {
        log::debug!("exit status {} for: {}", result.exit_status, line);
    }

    Ok(result)
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= LOG_EXCERPT_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(LOG_EXCERPT_CHARS).collect();
    format!("{}... [truncated]", head)
}
