// src/models.rs

use std::fmt;
use std::path::PathBuf;

use crate::core::error::DeployError;
use crate::core::validation;

// --- INPUT MODELS ---

/// Everything the user asked for on the command line, fixed for the whole invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentRequest {
    /// Explicit project name. Empty means "auto-detect from the git remote".
    pub project: String,
    pub framework: Option<String>,
    pub interactive: bool,
    pub ai_enabled: bool,
    /// `KEY=VALUE` assignments written to the remote `.env` before framework tasks.
    pub env_assignments: Vec<EnvAssignment>,
}

/// A single `KEY=VALUE` pair whose key and value have already been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    pub key: String,
    pub value: String,
}

impl EnvAssignment {
    /// Parses `KEY=VALUE`, splitting on the first `=`. The value may itself contain `=`.
    pub fn parse(raw: &str) -> Result<Self, DeployError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| DeployError::InvalidKey(raw.to_string()))?;
        if !validation::is_valid_env_key(key) {
            return Err(DeployError::InvalidKey(key.to_string()));
        }
        if !validation::is_valid_env_value(value) {
            return Err(DeployError::InvalidValue(key.to_string()));
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// A project name that is safe to place in a remote path and in a supervisor command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectIdentity(String);

impl ProjectIdentity {
    /// Validates `raw`; a rejected name is `DeployError::InvalidInput`.
    pub fn new(raw: &str) -> Result<Self, DeployError> {
        if validation::validate_project_name(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DeployError::InvalidInput(raw.to_string()))
        }
    }

    /// The validated project name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The project's checkout on the remote host: `<base_dir>/<name>`.
    pub fn remote_dir(&self, base_dir: &str) -> String {
        format!("{}/{}", base_dir.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection parameters for the staging host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub key_path: PathBuf,
    pub port: u16,
}

impl Credentials {
    /// `user@host`, as understood by `ssh`.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

// --- FRAMEWORK MODELS ---

/// Frameworks with built-in build steps. Anything else deploys without extra steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    NestJs,
    ExpressJs,
}

impl Framework {
    /// Case-insensitive lookup. Unknown names are not an error, they just have no steps.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "nestjs" => Some(Self::NestJs),
            "expressjs" => Some(Self::ExpressJs),
            _ => None,
        }
    }

    /// Canonical lowercase name, as shown in the report.
    pub fn name(self) -> &'static str {
        match self {
            Self::NestJs => "nestjs",
            Self::ExpressJs => "expressjs",
        }
    }
}

/// One entry of the interactive menu, or one scripted build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    InstallDependencies,
    PrismaGenerate,
    PrismaMigrate,
    Build,
    UpdateEnvVar,
    Continue,
}

impl TaskAction {
    /// Menu label, also used as the step label in the report.
    pub fn label(self) -> &'static str {
        match self {
            Self::InstallDependencies => "Install dependencies (npm install)",
            Self::PrismaGenerate => "Generate Prisma client (npx prisma generate)",
            Self::PrismaMigrate => "Apply Prisma migrations (npx prisma migrate deploy)",
            Self::Build => "Build (npm run build)",
            Self::UpdateEnvVar => "Update an environment variable",
            Self::Continue => "Continue to restart",
        }
    }
}

// --- REPORT MODELS ---

/// What happened in one remote step of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub label: String,
    pub command: String,
    pub exit_status: i32,
}

impl StepRecord {
    pub fn succeeded(&self) -> bool {
        self.exit_status == 0
    }
}

/// The ordered outcome of a finished deployment.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub project: String,
    pub framework: Option<String>,
    pub steps: Vec<StepRecord>,
    pub summary: Option<String>,
}
