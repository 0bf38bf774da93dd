// src/core/settings.rs

//! Process-wide configuration, resolved once before anything connects.
//!
//! Precedence, highest first: environment variables (a local `./.env` is loaded
//! into the environment by the binary beforehand), then `config.toml`, then the
//! built-in defaults from [`crate::constants`].

use crate::constants::{
    DEFAULT_BASE_DIR, DEFAULT_FALLBACK_TARGET, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL,
    DEFAULT_SSH_PORT, DEFAULT_SSH_USERNAME,
};
use crate::core::{error::DeployError, paths};
use crate::models::Credentials;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value '{value}' for {name}.")]
    InvalidValue { name: &'static str, value: String },
}

// --- TOML MODELS ---

/// The optional `config.toml`. Every field may be omitted.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub ssh: SshSection,
    pub deploy: DeploySection,
    pub ai: AiSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSection {
    pub host: Option<String>,
    pub username: Option<String>,
    pub key_path: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploySection {
    pub interactive: Option<bool>,
    pub base_dir: Option<String>,
    pub fallback_target: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiSection {
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

impl FileConfig {
    /// Reads `path`. A missing file yields the all-defaults config.
    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                source: e,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

// --- RESOLVED SETTINGS ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: Option<String>,
    pub username: String,
    pub key_path: Option<PathBuf>,
    pub port: u16,
    /// Whether `deploy` runs the interactive menu when neither `--ask` nor `--yes` is given.
    pub interactive_default: bool,
    pub base_dir: String,
    pub fallback_target: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub repo_map_path: Option<PathBuf>,
}

impl Settings {
    /// Resolves settings from the real process environment and the settings file.
    pub fn load() -> Result<Self, SettingsError> {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let file = match paths::config_file_path(&env) {
            Some(path) => {
                log::debug!("Reading settings from '{}'", path.display());
                FileConfig::read(&path)?
            }
            None => FileConfig::default(),
        };
        Self::from_sources(file, &env)
    }

    /// Merges an already-read settings file with an environment lookup.
    pub fn from_sources(
        file: FileConfig,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let port = match env("SSH_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| SettingsError::InvalidValue {
                    name: "SSH_PORT",
                    value: raw.clone(),
                })?,
            None => file.ssh.port.unwrap_or(DEFAULT_SSH_PORT),
        };

        let interactive_default = match env("STAGEHAND_INTERACTIVE") {
            Some(raw) => parse_bool(&raw).ok_or(SettingsError::InvalidValue {
                name: "STAGEHAND_INTERACTIVE",
                value: raw.clone(),
            })?,
            None => file.deploy.interactive.unwrap_or(false),
        };

        let key_path = env("SSH_KEY_PATH")
            .or(file.ssh.key_path)
            .map(|raw| PathBuf::from(shellexpand::tilde(&raw).into_owned()));

        Ok(Self {
            host: env("SSH_HOST").or(file.ssh.host),
            username: env("SSH_USERNAME")
                .or(file.ssh.username)
                .unwrap_or_else(|| DEFAULT_SSH_USERNAME.to_string()),
            key_path,
            port,
            interactive_default,
            base_dir: file
                .deploy
                .base_dir
                .unwrap_or_else(|| DEFAULT_BASE_DIR.to_string()),
            fallback_target: file
                .deploy
                .fallback_target
                .unwrap_or_else(|| DEFAULT_FALLBACK_TARGET.to_string()),
            gemini_api_key: env("GEMINI_API_KEY"),
            gemini_model: env("GEMINI_MODEL")
                .or(file.ai.model)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_endpoint: file
                .ai
                .endpoint
                .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string()),
            repo_map_path: paths::repo_map_path(env),
        })
    }

    /// Host and key path are mandatory; the user and port have defaults.
    pub fn credentials(&self) -> Result<Credentials, DeployError> {
        match (&self.host, &self.key_path) {
            (Some(host), Some(key_path)) => Ok(Credentials {
                host: host.clone(),
                username: self.username.clone(),
                key_path: key_path.clone(),
                port: self.port,
            }),
            (None, None) => Err(DeployError::MissingCredentials(
                "SSH_HOST and SSH_KEY_PATH".to_string(),
            )),
            (None, Some(_)) => Err(DeployError::MissingCredentials("SSH_HOST".to_string())),
            (Some(_), None) => Err(DeployError::MissingCredentials("SSH_KEY_PATH".to_string())),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_apply_without_any_source() {
        let settings = Settings::from_sources(FileConfig::default(), &lookup(&[])).unwrap();
        assert_eq!(settings.host, None);
        assert_eq!(settings.username, "root");
        assert_eq!(settings.port, 22);
        assert!(!settings.interactive_default);
        assert_eq!(settings.base_dir, "/var/www");
        assert_eq!(settings.fallback_target, "ecosystem.config.js");
        assert_eq!(settings.gemini_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [ssh]
            host = "file.example.com"
            username = "deploy"
            port = 2200

            [deploy]
            interactive = true
            base_dir = "/srv/apps"
            "#,
        )
        .unwrap();
        let env = lookup(&[
            ("SSH_HOST", "env.example.com"),
            ("SSH_KEY_PATH", "/keys/id_ed25519"),
            ("STAGEHAND_INTERACTIVE", "no"),
        ]);

        let settings = Settings::from_sources(file, &env).unwrap();

        assert_eq!(settings.host.as_deref(), Some("env.example.com"));
        assert_eq!(settings.username, "deploy");
        assert_eq!(settings.port, 2200);
        assert!(!settings.interactive_default);
        assert_eq!(settings.base_dir, "/srv/apps");

        let credentials = settings.credentials().unwrap();
        assert_eq!(credentials.destination(), "deploy@env.example.com");
        assert_eq!(credentials.key_path, PathBuf::from("/keys/id_ed25519"));
    }

    #[test]
    fn test_key_path_tilde_is_expanded() {
        let env = lookup(&[("SSH_HOST", "h"), ("SSH_KEY_PATH", "~/.ssh/id_rsa")]);
        let settings = Settings::from_sources(FileConfig::default(), &env).unwrap();
        let key = settings.key_path.unwrap();
        assert!(!key.starts_with("~"));
        assert!(key.ends_with(".ssh/id_rsa"));
    }

    #[test]
    fn test_missing_credentials_name_the_missing_variable() {
        let only_host = Settings::from_sources(FileConfig::default(), &lookup(&[("SSH_HOST", "h")]))
            .unwrap();
        match only_host.credentials() {
            Err(DeployError::MissingCredentials(what)) => assert_eq!(what, "SSH_KEY_PATH"),
            other => panic!("unexpected: {:?}", other),
        }

        let nothing = Settings::from_sources(FileConfig::default(), &lookup(&[])).unwrap();
        assert!(matches!(
            nothing.credentials(),
            Err(DeployError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Settings::from_sources(FileConfig::default(), &lookup(&[("SSH_PORT", "ssh")]));
        assert!(matches!(
            result,
            Err(SettingsError::InvalidValue { name: "SSH_PORT", .. })
        ));
    }

    #[test]
    fn test_settings_file_read_and_errors() {
        let dir = tempdir().unwrap();
        let missing = FileConfig::read(&dir.path().join("config.toml")).unwrap();
        assert!(missing.ssh.host.is_none());

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[ssh]\nhots = \"typo\"\n").unwrap();
        assert!(matches!(
            FileConfig::read(&bad),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
