// src/core/error.rs

use thiserror::Error;

use crate::core::{env_file::EnvFileError, repo_map::RepoMapError, settings::SettingsError};
use crate::system::remote::{ConnectionError, RemoteError};

/// Every way a deployment can stop early.
///
/// Validation and configuration failures are raised before any remote session
/// is opened. Everything from `Connection` down happens with (or while opening)
/// the session, and the sequencer still tears the session down.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Invalid project name '{0}': only ASCII letters, digits, '.', '_' and '-' are allowed.")]
    InvalidInput(String),
    #[error("Invalid environment variable key '{0}': must match [A-Za-z_][A-Za-z0-9_]*.")]
    InvalidKey(String),
    #[error("The value for '{0}' contains a line break, which a .env line cannot hold.")]
    InvalidValue(String),
    #[error(
        "Could not determine the project. Pass --project or map this repository's remote in the repo map file."
    )]
    UnresolvedProject,
    #[error("Missing SSH credentials: {0} must be set.")]
    MissingCredentials(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    RemoteExecution(#[from] RemoteError),
    #[error("Step '{step}' failed with exit status {status}.")]
    StepFailed { step: String, status: i32 },
    #[error("Interactive prompt failed: {0}")]
    Prompt(String),
}

impl From<SettingsError> for DeployError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RepoMapError> for DeployError {
    fn from(err: RepoMapError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<EnvFileError> for DeployError {
    fn from(err: EnvFileError) -> Self {
        match err {
            EnvFileError::InvalidKey(key) => Self::InvalidKey(key),
            EnvFileError::Remote(remote) => Self::RemoteExecution(remote),
            EnvFileError::InvalidValue { key } => Self::InvalidValue(key),
            EnvFileError::StepFailed { step, status, .. } => Self::StepFailed {
                step: step.to_string(),
                status,
            },
        }
    }
}
