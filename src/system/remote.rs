// src/system/remote.rs

use crate::models::Credentials;
use thiserror::Error;

/// Output of one command evaluated on the remote host.
///
/// A non-zero `exit_status` is data, not an error: callers branch on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// `true` for exit status 0.
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// The session could not evaluate a command at all (dropped, auth lost, ssh missing).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Remote command '{command}' could not be executed: {cause}")]
pub struct RemoteError {
    pub command: String,
    pub cause: String,
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Could not connect to {destination}: {reason}")]
    Refused { destination: String, reason: String },
    #[error("Could not start ssh: {0}")]
    Spawn(#[from] std::io::Error),
}

/// One open, authenticated shell connection to the staging host.
pub trait RemoteShell {
    /// Evaluates `command_line` with the remote user's shell and waits for it to finish.
    fn exec(&mut self, command_line: &str) -> Result<CommandResult, RemoteError>;

    /// Releases the connection. Calling it more than once is a no-op.
    fn close(&mut self);
}

/// Opens [`RemoteShell`] sessions.
pub trait Connector {
    type Session: RemoteShell;

    fn connect(&self, credentials: &Credentials) -> Result<Self::Session, ConnectionError>;
}
