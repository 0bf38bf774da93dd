// src/core/git_remote.rs

use crate::system::executor;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // scheme://[user@]host[:port]/owner/repo[.git][/]
    static ref URL_REMOTE: Regex = Regex::new(
        r"^[A-Za-z][A-Za-z0-9+.-]*://(?:[^@/\s]+@)?[^/\s]+/(?P<owner>[^/\s]+)/(?P<repo>[^/\s]+?)(?:\.git)?/?$"
    )
    .expect("URL remote pattern is valid");
    // [user@]host:owner/repo[.git][/]
    static ref SCP_REMOTE: Regex = Regex::new(
        r"^(?:[^@/:\s]+@)?[^@/:\s]+:(?P<owner>[^/:\s]+)/(?P<repo>[^/\s]+?)(?:\.git)?/?$"
    )
    .expect("scp-style remote pattern is valid");
}

/// Reads `remote.origin.url` of the repository containing `workdir` and returns its
/// `owner/repo` slug. Any failure (no git, not a repository, no remote, odd URL)
/// is `None`.
pub fn resolve_repo_slug(workdir: &Path) -> Option<String> {
    match executor::execute_and_capture_output("git config --get remote.origin.url", workdir) {
        Ok(url) => {
            let slug = parse_repo_slug(url.trim());
            if slug.is_none() {
                log::debug!("Remote URL '{}' has no recognizable owner/repo", url.trim());
            }
            slug
        }
        Err(e) => {
            log::debug!("No git remote available: {}", e);
            None
        }
    }
}

/// Extracts `owner/repo` from an SSH (`git@host:owner/repo.git`) or URL-style
/// (`https://host/owner/repo.git`) remote. The `.git` suffix is optional.
pub fn parse_repo_slug(url: &str) -> Option<String> {
    let captures = URL_REMOTE
        .captures(url)
        .or_else(|| SCP_REMOTE.captures(url))?;
    let owner = captures.name("owner")?.as_str();
    let repo = captures.name("repo")?.as_str();
    if repo.is_empty() || owner == "." || owner == ".." || repo == "." || repo == ".." {
        return None;
    }
    Some(format!("{}/{}", owner, repo))
}
