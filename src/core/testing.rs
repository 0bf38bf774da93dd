// src/core/testing.rs
//
// Test doubles for the remote layer.

use crate::models::Credentials;
use crate::system::remote::{CommandResult, ConnectionError, Connector, RemoteError, RemoteShell};
use std::cell::RefCell;
use std::path::Path;
use std::process::{Command, Stdio};
use std::rc::Rc;
use tempfile::TempDir;

/// Evaluates command lines with a real `sh` inside a scratch directory.
pub(crate) struct LocalShell {
    dir: TempDir,
}

impl LocalShell {
    pub(crate) fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn dir_str(&self) -> String {
        self.dir.path().to_str().unwrap().to_string()
    }
}

impl RemoteShell for LocalShell {
    fn exec(&mut self, command_line: &str) -> Result<CommandResult, RemoteError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .current_dir(self.dir.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RemoteError {
                command: command_line.to_string(),
                cause: e.to_string(),
            })?;
        Ok(CommandResult {
            exit_status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn close(&mut self) {}
}

/// A shared, ordered log of everything a scripted session saw.
pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

/// Answers every command with a scripted status, recording the command line.
pub(crate) struct ScriptedSession {
    events: EventLog,
    // (substring, status): the first rule whose substring appears in the command wins.
    rules: Vec<(String, i32)>,
    fail_on: Option<String>,
}

impl RemoteShell for ScriptedSession {
    fn exec(&mut self, command_line: &str) -> Result<CommandResult, RemoteError> {
        self.events.borrow_mut().push(format!("exec: {}", command_line));
        if let Some(needle) = &self.fail_on {
            if command_line.contains(needle.as_str()) {
                return Err(RemoteError {
                    command: command_line.to_string(),
                    cause: "connection reset".to_string(),
                });
            }
        }
        let exit_status = self
            .rules
            .iter()
            .find(|(needle, _)| command_line.contains(needle.as_str()))
            .map(|(_, status)| *status)
            .unwrap_or(0);
        Ok(CommandResult {
            exit_status,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn close(&mut self) {
        self.events.borrow_mut().push("close".to_string());
    }
}

/// Hands out [`ScriptedSession`]s, or refuses to connect.
pub(crate) struct ScriptedConnector {
    pub(crate) events: EventLog,
    pub(crate) rules: Vec<(String, i32)>,
    pub(crate) fail_on: Option<String>,
    pub(crate) refuse: bool,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
            rules: Vec::new(),
            fail_on: None,
            refuse: false,
        }
    }

    pub(crate) fn with_status(mut self, needle: &str, status: i32) -> Self {
        self.rules.push((needle.to_string(), status));
        self
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self, credentials: &Credentials) -> Result<ScriptedSession, ConnectionError> {
        self.events
            .borrow_mut()
            .push(format!("connect: {}", credentials.destination()));
        if self.refuse {
            return Err(ConnectionError::Refused {
                destination: credentials.destination(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(ScriptedSession {
            events: Rc::clone(&self.events),
            rules: self.rules.clone(),
            fail_on: self.fail_on.clone(),
        })
    }
}
