// src/system/ssh.rs

use crate::models::Credentials;
use crate::system::remote::{CommandResult, ConnectionError, Connector, RemoteError, RemoteShell};
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// The exit status OpenSSH itself uses for "could not talk to the server".
const SSH_FAILURE_STATUS: i32 = 255;

/// Opens sessions backed by a persistent OpenSSH ControlMaster.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector;

impl Connector for SshConnector {
    type Session = SshSession;

    /// Authenticates once and leaves a master connection running in the background.
    /// Every later `exec` is multiplexed over it, so no further handshakes happen.
    fn connect(&self, credentials: &Credentials) -> Result<SshSession, ConnectionError> {
        let control_dir = tempfile::Builder::new().prefix("stagehand-ssh-").tempdir()?;
        let control_path = control_dir.path().join("master.sock");
        let log_path = control_dir.path().join("connect.log");
        let destination = credentials.destination();

        // The backgrounded master (`-f`) inherits our stdio, so stderr goes to a file
        // instead of a pipe; a pipe would never reach EOF while the master lives.
        let log_file = File::create(&log_path)?;
        log::debug!("Opening SSH master connection to {}", destination);
        let status = Command::new("ssh")
            .arg("-M")
            .arg("-N")
            .arg("-f")
            .args(["-o", "ControlMaster=yes"])
            .args(["-o", "ControlPersist=yes"])
            .arg("-o")
            .arg(format!("ControlPath={}", control_path.display()))
            .args(["-o", "BatchMode=yes"])
            .args(["-o", "StrictHostKeyChecking=accept-new"])
            .arg("-i")
            .arg(&credentials.key_path)
            .arg("-p")
            .arg(credentials.port.to_string())
            .arg(&destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_file))
            .status()?;

        if !status.success() {
            let reason = fs::read_to_string(&log_path)
                .map(|s| s.trim().to_string())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("ssh exited with {}", status));
            return Err(ConnectionError::Refused {
                destination,
                reason,
            });
        }

        Ok(SshSession {
            destination,
            control_path,
            _control_dir: control_dir,
            closed: false,
        })
    }
}

/// A live ControlMaster connection. Dropping it closes the master.
#[derive(Debug)]
pub struct SshSession {
    destination: String,
    control_path: PathBuf,
    // Owns the directory holding the control socket; removed on drop.
    _control_dir: TempDir,
    closed: bool,
}

impl SshSession {
    fn base_command(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-S")
            .arg(&self.control_path)
            .args(["-o", "ControlMaster=no"])
            .args(["-o", "BatchMode=yes"]);
        cmd
    }

    /// Asks the master whether it is still running.
    fn master_alive(&self) -> bool {
        self.base_command()
            .args(["-O", "check"])
            .arg(&self.destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl RemoteShell for SshSession {
    fn exec(&mut self, command_line: &str) -> Result<CommandResult, RemoteError> {
        let remote_error = |cause: String| RemoteError {
            command: command_line.to_string(),
            cause,
        };

        if self.closed {
            return Err(remote_error("session already closed".to_string()));
        }

        let output = self
            .base_command()
            .arg("-T")
            .arg("--")
            .arg(&self.destination)
            .arg(command_line)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| remote_error(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let exit_status = match output.status.code() {
            Some(code) => code,
            None => {
                return Err(remote_error(format!(
                    "ssh terminated by signal ({})",
                    output.status
                )));
            }
        };

        // 255 is ambiguous: either ssh failed, or the remote command itself exited 255.
        if exit_status == SSH_FAILURE_STATUS && !self.master_alive() {
            let cause = if stderr.trim().is_empty() {
                "connection to the staging host was lost".to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(remote_error(cause));
        }

        Ok(CommandResult {
            exit_status,
            stdout,
            stderr,
        })
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        log::debug!("Closing SSH master connection to {}", self.destination);
        let result = self
            .base_command()
            .args(["-O", "exit"])
            .arg(&self.destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = result {
            log::warn!("Failed to stop SSH master for {}: {}", self.destination, e);
        }
        let _ = fs::remove_file(&self.control_path);
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        self.close();
    }
}
