use crate::error::{CopilotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Owner and name of a repository, as taken from its URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSlug {
    /// Account or organization
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parses `https://github.com/<owner>/<repo>[/...]`.
///
/// The host must be exactly `github.com` and the path must hold at least two non-empty
/// segments; anything after the repository name (`/tree/main`, `/issues`) is ignored. A single
/// trailing `.git` is dropped from the name.
pub fn parse_repo_url(input: &str) -> Result<RepoSlug> {
    let invalid = || CopilotError::InvalidRepoUrl(input.to_string());

    let parsed = Url::parse(input.trim()).map_err(|_| invalid())?;
    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let mut segments = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty());

    let (Some(owner), Some(repo)) = (segments.next(), segments.next()) else {
        return Err(invalid());
    };
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoSlug {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}
