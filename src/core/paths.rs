// src/core/paths.rs

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, REPO_MAP_FILENAME};
use std::path::PathBuf;

/// Environment variable overriding the settings file location.
pub const CONFIG_PATH_VAR: &str = "STAGEHAND_CONFIG";

/// Environment variable overriding the repo map location.
pub const REPO_MAP_PATH_VAR: &str = "STAGEHAND_REPO_MAP";

/// Returns the stagehand configuration directory (`~/.config/stagehand` on Linux).
/// `None` when the platform has no notion of a user config directory.
///
/// The directory is only read from, so it is never created.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
}

/// Location of `config.toml`, honoring `STAGEHAND_CONFIG`.
pub fn config_file_path(env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    resolve(env, CONFIG_PATH_VAR, CONFIG_FILENAME)
}

/// Location of `repos.json`, honoring `STAGEHAND_REPO_MAP`.
pub fn repo_map_path(env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    resolve(env, REPO_MAP_PATH_VAR, REPO_MAP_FILENAME)
}

fn resolve(env: &dyn Fn(&str) -> Option<String>, var: &str, filename: &str) -> Option<PathBuf> {
    match env(var) {
        Some(explicit) => Some(PathBuf::from(shellexpand::tilde(&explicit).into_owned())),
        None => config_dir().map(|dir| dir.join(filename)),
    }
}
