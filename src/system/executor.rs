// src/system/executor.rs

use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Executes a local command and captures its standard output.
///
/// The command line is split with POSIX shell rules but never handed to a shell.
/// Stderr is discarded: callers only use this for read-only queries whose failure
/// they treat as "no answer".
pub fn execute_and_capture_output(
    command_line: &str,
    cwd: &Path,
) -> Result<String, ExecutionError> {
    let trimmed_command = command_line.trim();
    if trimmed_command.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    let (program, args) = parts.split_first().ok_or(ExecutionError::EmptyCommand)?;

    log::debug!("Running local command: {}", trimmed_command);
    let command_output = StdCommand::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(trimmed_command.to_string(), e))?;

    if !command_output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus(
            trimmed_command.to_string(),
        ));
    }

    String::from_utf8(command_output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: trimmed_command.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_captures_stdout() {
        let dir = tempdir().unwrap();
        let out = execute_and_capture_output("echo 'hello world'", dir.path()).unwrap();
        assert_eq!(out.trim(), "hello world");
    }

    #[test]
    fn test_empty_and_unbalanced_commands_are_rejected() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            execute_and_capture_output("   ", dir.path()),
            Err(ExecutionError::EmptyCommand)
        ));
        assert!(matches!(
            execute_and_capture_output("echo 'unterminated", dir.path()),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[test]
    fn test_non_zero_exit_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            execute_and_capture_output("false", dir.path()),
            Err(ExecutionError::NonZeroExitStatus(_))
        ));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            execute_and_capture_output("definitely-not-a-real-program-xyz", dir.path()),
            Err(ExecutionError::CommandFailed(_, _))
        ));
    }
}
