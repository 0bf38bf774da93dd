// src/constants.rs

/// The name of the directory holding stagehand configuration (inside the user config dir).
pub const CONFIG_DIR_NAME: &str = "stagehand";

/// The name of the optional settings file (inside the config dir).
pub const CONFIG_FILENAME: &str = "config.toml";

/// The name of the optional `owner/repo` -> project mapping file (inside the config dir).
pub const REPO_MAP_FILENAME: &str = "repos.json";

/// The name of the key/value environment file inside a remote project directory.
pub const ENV_FILE_NAME: &str = ".env";

/// Remote directory under which every project checkout lives.
pub const DEFAULT_BASE_DIR: &str = "/var/www";

/// SSH user used when `SSH_USERNAME` is not set.
pub const DEFAULT_SSH_USERNAME: &str = "root";

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Supervisor target restarted when the project's own entry cannot be restarted.
pub const DEFAULT_FALLBACK_TARGET: &str = "ecosystem.config.js";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Number of recent commits included in the AI summary prompt.
pub const SUMMARY_COMMIT_COUNT: u32 = 5;
