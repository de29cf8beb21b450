//! Records persisted in the store.
//!
//! Field names are camelCase on disk so exported backups keep one stable shape.

use crate::github::RepoSlug;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The repository currently loaded. Replaced wholesale by every successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedRepoInfo {
    /// Account or organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch the files and commits were read from
    pub default_branch: String,
    /// URL exactly as the user supplied it
    pub url: String,
}

impl LoadedRepoInfo {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Owner and name for API calls
    pub fn slug(&self) -> RepoSlug {
        RepoSlug {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
        }
    }
}

/// A decoded text file from a repository tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    /// Path relative to the repository root
    pub path: String,
    /// UTF-8 contents
    pub content: String,
    /// Git file mode
    pub mode: String,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Name used by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the repository chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Millisecond timestamp rendered as a string
    pub id: String,
    /// Speaker
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a message identified by the current time plus `offset` milliseconds
    pub fn new(role: Role, content: impl Into<String>, offset: i64) -> Self {
        Self {
            id: (Utc::now().timestamp_millis() + offset).to_string(),
            role,
            content: content.into(),
        }
    }
}

/// A free-form note written by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Epoch milliseconds
    pub created_at: i64,
}

impl Note {
    /// Builds a note, splitting `tags` on commas and dropping blanks
    pub fn new(title: &str, content: &str, tags: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            tags: split_tags(tags),
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Splits a comma-separated tag list, trimming each tag and dropping empty ones
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A meeting transcript and its model-generated summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: String,
    pub original_content: String,
    pub summary: String,
    pub action_items: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// How a project file's content is encoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

impl FileEncoding {
    /// Value of the `encoding` field of the blob API
    pub fn as_str(&self) -> &'static str {
        match self {
            FileEncoding::Utf8 => "utf-8",
            FileEncoding::Base64 => "base64",
        }
    }
}

/// A file of a project staged for publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    pub content: String,
    pub mode: String,
    #[serde(default)]
    pub encoding: FileEncoding,
}

/// A generated or local project waiting to be pushed to a new repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProject {
    pub name: String,
    pub files: Vec<ProjectFile>,
}

/// A memoised commit explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitExplanation {
    /// Explanation text; empty when the request failed
    pub summary: String,
    /// Failure message from the last attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_loaded_repo_uses_camel_case() {
        let info = LoadedRepoInfo {
            owner: "octocat".into(),
            repo: "Hello-World".into(),
            default_branch: "master".into(),
            url: "https://github.com/octocat/Hello-World".into(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["defaultBranch"], "master");
        assert_eq!(info.full_name(), "octocat/Hello-World");
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(" rust, cli ,,async "), vec!["rust", "cli", "async"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
