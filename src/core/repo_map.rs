// src/core/repo_map.rs

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoMapError {
    #[error("Could not read repo map '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Repo map '{path}' is not a JSON object of \"owner/repo\": \"project\" pairs: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Static `"owner/repo" -> project` table used to auto-detect the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RepoMapping(HashMap<String, String>);

impl RepoMapping {
    /// Loads the mapping from `path`. A missing file is an empty mapping.
    pub fn load(path: &Path) -> Result<Self, RepoMapError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No repo map at '{}', using an empty mapping", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RepoMapError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&content).map_err(|e| RepoMapError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Exact lookup first; hosting providers treat slugs case-insensitively, so
    /// fall back to a case-insensitive match.
    pub fn lookup(&self, slug: &str) -> Option<&str> {
        if let Some(project) = self.0.get(slug) {
            return Some(project.as_str());
        }
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(slug))
            .map(|(_, project)| project.as_str())
    }
}
