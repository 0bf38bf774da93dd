// src/core/env_file.rs

//! Remote `.env` mutation.
//!
//! There is no query language and no lock on the remote side, only shell tools,
//! so every change is a short sequence of escaped commands:
//!
//! 1. Check with `grep -q '^KEY='`. Exit 0 means present, anything else absent.
//! 2. Present: copy the file (mode preserved) to a uniquely named sibling, refill it
//!    with every line except `KEY=...`, append the new line, then `mv` it over the
//!    original. Only the `mv` touches the original path.
//! 3. Absent: append the new line to the file, creating it if needed.
//!
//! A replaced key therefore moves to the end of the file. The check and the rename
//! are not atomic as a pair; a concurrent writer between them is not guarded against.

use crate::constants::ENV_FILE_NAME;
use crate::core::command::ShellCommand;
use crate::core::runner;
use crate::core::validation::{is_valid_env_key, is_valid_env_value};
use crate::system::remote::{RemoteError, RemoteShell};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EnvFileError {
    #[error("Invalid environment variable key '{0}': must match [A-Za-z_][A-Za-z0-9_]*.")]
    InvalidKey(String),
    #[error("The value for '{key}' contains a line break, which a .env line cannot hold.")]
    InvalidValue { key: String },
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("Could not {step} (exit status {status}): {stderr}")]
    StepFailed {
        step: &'static str,
        status: i32,
        stderr: String,
    },
}

/// How a `set_env_var` call changed the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvUpdate {
    /// The key existed; every old line was dropped and the new one appended.
    Replaced,
    /// The key was new and was appended.
    Appended,
}

/// Sets `key=value` in `<remote_dir>/.env` on the remote host.
///
/// Afterwards the file holds exactly one `key=` line, carrying `value`, and every
/// other line keeps its relative order.
pub fn set_env_var(
    session: &mut dyn RemoteShell,
    remote_dir: &str,
    key: &str,
    value: &str,
) -> Result<EnvUpdate, EnvFileError> {
    if !is_valid_env_key(key) {
        return Err(EnvFileError::InvalidKey(key.to_string()));
    }
    if !is_valid_env_value(value) {
        return Err(EnvFileError::InvalidValue {
            key: key.to_string(),
        });
    }

    let env_path = format!("{}/{}", remote_dir.trim_end_matches('/'), ENV_FILE_NAME);
    let line = format!("{}={}", key, value);
    // Keys are [A-Za-z0-9_] only, so the pattern has no regex metacharacters to escape.
    let pattern = format!("^{}=", key);

    let check = ShellCommand::new("grep")
        .flag("-q")
        .flag("-e")
        .arg(&pattern)
        .arg(&env_path);
    let present = runner::run(session, &check, None)?.success();

    if present {
        log::debug!("'{}' present in {}, rewriting the file", key, env_path);
        replace_line(session, &env_path, &pattern, &line)?;
        Ok(EnvUpdate::Replaced)
    } else {
        log::debug!("'{}' absent from {}, appending", key, env_path);
        append_line(session, &env_path, &line)?;
        Ok(EnvUpdate::Appended)
    }
}

fn replace_line(
    session: &mut dyn RemoteShell,
    env_path: &str,
    pattern: &str,
    line: &str,
) -> Result<(), EnvFileError> {
    let temp_path = format!("{}.stagehand-{}.tmp", env_path, Uuid::new_v4().simple());

    let result = write_replacement(session, env_path, &temp_path, pattern, line);
    if result.is_err() {
        // Best effort: the original is untouched, only the sibling may be left behind.
        let cleanup = ShellCommand::new("rm").flag("-f").arg(&temp_path);
        if let Err(e) = runner::run(session, &cleanup, None) {
            log::warn!("Could not remove temporary file {}: {}", temp_path, e);
        }
    }
    result
}

fn write_replacement(
    session: &mut dyn RemoteShell,
    env_path: &str,
    temp_path: &str,
    pattern: &str,
    line: &str,
) -> Result<(), EnvFileError> {
    // The copy exists only to give the temp file the original's permissions.
    let copy = ShellCommand::new("cp").flag("-p").arg(env_path).arg(temp_path);
    expect_status(session, &copy, "copy the env file", &[0])?;

    // grep exits 1 when no line survives the filter, which is a valid (empty) result.
    let filter = ShellCommand::new("grep")
        .flag("-v")
        .flag("-e")
        .arg(pattern)
        .arg(env_path)
        .write_to(temp_path);
    expect_status(session, &filter, "filter the env file", &[0, 1])?;

    let append = ShellCommand::new("printf")
        .arg("%s\\n")
        .arg(line)
        .append_to(temp_path);
    expect_status(session, &append, "append the new line", &[0])?;

    let rename = ShellCommand::new("mv").flag("-f").arg(temp_path).arg(env_path);
    expect_status(session, &rename, "replace the env file", &[0])
}

fn append_line(
    session: &mut dyn RemoteShell,
    env_path: &str,
    line: &str,
) -> Result<(), EnvFileError> {
    // Without this, a file whose last line lacks "\n" would have the new line glued onto it.
    let last_byte = ShellCommand::new("tail").flag("-c").flag("1").arg(env_path);
    let tail = runner::run(session, &last_byte, None)?;
    let needs_separator = tail.success() && !tail.stdout.is_empty() && tail.stdout != "\n";

    let format = if needs_separator { "\\n%s\\n" } else { "%s\\n" };
    let append = ShellCommand::new("printf")
        .arg(format)
        .arg(line)
        .append_to(env_path);
    expect_status(session, &append, "append to the env file", &[0])
}

fn expect_status(
    session: &mut dyn RemoteShell,
    command: &ShellCommand,
    step: &'static str,
    accepted: &[i32],
) -> Result<(), EnvFileError> {
    let result = runner::run(session, command, None)?;
    if accepted.contains(&result.exit_status) {
        Ok(())
    } else {
        Err(EnvFileError::StepFailed {
            step,
            status: result.exit_status,
            stderr: result.stderr.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::LocalShell;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn env_contents(shell: &LocalShell) -> String {
        fs::read_to_string(shell.dir().join(ENV_FILE_NAME)).unwrap()
    }

    fn write_env(shell: &LocalShell, contents: &str) {
        fs::write(shell.dir().join(ENV_FILE_NAME), contents).unwrap();
    }

    fn leftover_temp_files(shell: &LocalShell) -> Vec<String> {
        fs::read_dir(shell.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_replacing_moves_key_to_end() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\nBAR=2\n");
        let dir = shell.dir_str();

        let update = set_env_var(&mut shell, &dir, "FOO", "3").unwrap();

        assert_eq!(update, EnvUpdate::Replaced);
        assert_eq!(env_contents(&shell), "BAR=2\nFOO=3\n");
        assert!(leftover_temp_files(&shell).is_empty());
    }

    #[test]
    fn test_setting_twice_is_idempotent() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\nBAR=2\n");
        let dir = shell.dir_str();

        set_env_var(&mut shell, &dir, "FOO", "3").unwrap();
        let first = env_contents(&shell);
        set_env_var(&mut shell, &dir, "FOO", "3").unwrap();

        assert_eq!(env_contents(&shell), first);
    }

    #[test]
    fn test_appending_new_key_keeps_prior_lines() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\nBAR=2\n");
        let dir = shell.dir_str();

        let update = set_env_var(&mut shell, &dir, "BAZ", "x").unwrap();

        assert_eq!(update, EnvUpdate::Appended);
        assert_eq!(env_contents(&shell), "FOO=1\nBAR=2\nBAZ=x\n");
    }

    #[test]
    fn test_append_separates_unterminated_last_line() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1");
        let dir = shell.dir_str();

        set_env_var(&mut shell, &dir, "BAZ", "x").unwrap();

        assert_eq!(env_contents(&shell), "FOO=1\nBAZ=x\n");
    }

    #[test]
    fn test_missing_file_is_created() {
        let mut shell = LocalShell::new();
        let dir = shell.dir_str();

        let update = set_env_var(&mut shell, &dir, "PORT", "3000").unwrap();

        assert_eq!(update, EnvUpdate::Appended);
        assert_eq!(env_contents(&shell), "PORT=3000\n");
    }

    #[test]
    fn test_duplicate_lines_collapse_to_one() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\nBAR=2\nFOO=old\n");
        let dir = shell.dir_str();

        set_env_var(&mut shell, &dir, "FOO", "new").unwrap();

        assert_eq!(env_contents(&shell), "BAR=2\nFOO=new\n");
    }

    #[test]
    fn test_file_holding_only_the_key_is_rewritten() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\n");
        let dir = shell.dir_str();

        set_env_var(&mut shell, &dir, "FOO", "2").unwrap();

        assert_eq!(env_contents(&shell), "FOO=2\n");
    }

    #[test]
    fn test_prefix_keys_are_not_confused() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO_BAR=1\nFOO=2\n");
        let dir = shell.dir_str();

        set_env_var(&mut shell, &dir, "FOO", "3").unwrap();

        assert_eq!(env_contents(&shell), "FOO_BAR=1\nFOO=3\n");
    }

    #[test]
    fn test_hostile_values_are_stored_literally() {
        let mut shell = LocalShell::new();
        write_env(&shell, "A=1\n");
        let dir = shell.dir_str();
        let value = "it's $(touch pwned) `id` ; echo $HOME %s \\n";

        set_env_var(&mut shell, &dir, "SECRET", value).unwrap();

        assert_eq!(env_contents(&shell), format!("A=1\nSECRET={}\n", value));
        assert!(!shell.dir().join("pwned").exists());
    }

    #[test]
    fn test_replacement_preserves_file_mode() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\n");
        let path = shell.dir().join(ENV_FILE_NAME);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let dir = shell.dir_str();

        set_env_var(&mut shell, &dir, "FOO", "2").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_invalid_key_performs_no_remote_action() {
        let mut shell = LocalShell::new();
        let dir = shell.dir_str();

        let err = set_env_var(&mut shell, &dir, "BAD-KEY", "x").unwrap_err();

        assert!(matches!(err, EnvFileError::InvalidKey(_)));
        assert!(!shell.dir().join(ENV_FILE_NAME).exists());
    }

    #[test]
    fn test_multiline_value_is_rejected() {
        let mut shell = LocalShell::new();
        let dir = shell.dir_str();

        let err = set_env_var(&mut shell, &dir, "KEY", "a\nB=2").unwrap_err();

        assert!(matches!(err, EnvFileError::InvalidValue { .. }));
        assert!(!shell.dir().join(ENV_FILE_NAME).exists());
    }

    #[test]
    fn test_failed_rename_leaves_original_intact() {
        let mut shell = LocalShell::new();
        write_env(&shell, "FOO=1\nBAR=2\n");
        let dir = shell.dir_str();
        // `mv` is the only step that touches the original; make it fail.
        let mut failing = FailingStep {
            inner: &mut shell,
            needle: "mv -f",
        };

        let err = set_env_var(&mut failing, &dir, "FOO", "3").unwrap_err();

        assert!(matches!(err, EnvFileError::StepFailed { .. }));
        assert_eq!(env_contents(&shell), "FOO=1\nBAR=2\n");
        assert!(leftover_temp_files(&shell).is_empty());
    }

    /// Delegates to a real shell but reports failure for one matching command.
    struct FailingStep<'a> {
        inner: &'a mut LocalShell,
        needle: &'static str,
    }

    impl RemoteShell for FailingStep<'_> {
        fn exec(
            &mut self,
            command_line: &str,
        ) -> Result<crate::system::remote::CommandResult, RemoteError> {
            if command_line.contains(self.needle) {
                return Ok(crate::system::remote::CommandResult {
                    exit_status: 1,
                    stdout: String::new(),
                    stderr: "simulated failure".to_string(),
                });
            }
            self.inner.exec(command_line)
        }

        fn close(&mut self) {}
    }
}
