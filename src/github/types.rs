use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account that owns a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    /// Login name
    pub login: String,
}

/// Subset of `GET /repos/{owner}/{repo}` used by the crate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoDetails {
    /// Repository name
    pub name: String,
    /// Owning account
    pub owner: Owner,
    /// Branch GitHub treats as canonical; `None` for empty repositories
    pub default_branch: Option<String>,
    /// Browser URL
    pub html_url: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the repository is private
    #[serde(default)]
    pub private: bool,
}

/// One node of a recursive git tree listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Git file mode, e.g. `100644`
    pub mode: String,
    /// `blob`, `tree` or `commit`
    #[serde(rename = "type")]
    pub kind: String,
    /// Object SHA
    pub sha: String,
    /// API URL of the object
    #[serde(default)]
    pub url: Option<String>,
}

impl TreeEntry {
    /// Whether this entry is a file
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// Response of `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitTree {
    /// Entries in listing order
    pub tree: Vec<TreeEntry>,
    /// Set by GitHub when the listing was cut short
    #[serde(default)]
    pub truncated: bool,
}

/// Response of a blob fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    /// Encoded payload
    pub content: String,
    /// `base64` or `utf-8`
    pub encoding: String,
}

/// A commit exactly as GitHub returned it.
///
/// The JSON is stored and re-emitted untouched; the accessors only read the fields the
/// prompts and listings need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitRecord(pub Value);

impl CommitRecord {
    /// Full SHA
    pub fn sha(&self) -> &str {
        self.0["sha"].as_str().unwrap_or_default()
    }

    /// Full commit message
    pub fn message(&self) -> &str {
        self.0["commit"]["message"].as_str().unwrap_or_default()
    }

    /// First line of the commit message
    pub fn subject(&self) -> &str {
        self.message().lines().next().unwrap_or_default()
    }

    /// Author name recorded in the commit
    pub fn author_name(&self) -> &str {
        self.0["commit"]["author"]["name"].as_str().unwrap_or("unknown")
    }

    /// Author date as an ISO 8601 string
    pub fn date(&self) -> &str {
        self.0["commit"]["author"]["date"].as_str().unwrap_or_default()
    }

    /// Browser URL
    pub fn html_url(&self) -> &str {
        self.0["html_url"].as_str().unwrap_or_default()
    }
}

/// One week of `GET /stats/commit_activity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyActivity {
    /// Commits in the week
    pub total: u64,
    /// Unix timestamp of the week start
    pub week: i64,
    /// Commits per weekday, Sunday first
    #[serde(default)]
    pub days: Vec<u64>,
}

/// Contributor identity in the statistics API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Login name
    pub login: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: String,
}

/// One week of a contributor's activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorWeek {
    /// Week start
    pub w: i64,
    /// Additions
    pub a: u64,
    /// Deletions
    pub d: u64,
    /// Commits
    pub c: u64,
}

/// One entry of `GET /stats/contributors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorStats {
    /// `None` for commits whose author has no GitHub account
    pub author: Option<Author>,
    /// Total commits
    pub total: u64,
    /// Weekly breakdown
    #[serde(default)]
    pub weeks: Vec<ContributorWeek>,
}

/// Issue or pull request state as listed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueState {
    /// `open` or `closed`
    pub state: String,
    /// Present when the issue is a pull request
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl IssueState {
    /// Whether the item is still open
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}

/// Repository collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    /// Login name
    pub login: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Role on the repository
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Object reference returned by the git data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitObject {
    /// Object SHA
    pub sha: String,
}

/// Entry for `POST /git/trees`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTreeEntry {
    /// File path
    pub path: String,
    /// File mode
    pub mode: String,
    /// Always `blob`
    #[serde(rename = "type")]
    pub kind: String,
    /// Blob SHA
    pub sha: String,
}
