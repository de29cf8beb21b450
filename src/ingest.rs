//! Turns a repository URL into a reference, a list of text files and recent commits.

use crate::config::Limits;
use crate::error::{CopilotError, Result};
use crate::filter::is_binary;
use crate::github::{parse_repo_url, Blob, CommitRecord, GitHubClient, TreeEntry};
use crate::models::{LoadedRepoInfo, RepoFile};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use log::{debug, info, warn};

const DETAILS_ERROR: &str = "Failed to fetch repository details.";

/// Everything a successful ingestion produced
#[derive(Debug, Clone)]
pub struct IngestedRepository {
    /// Reference to record as the loaded repository
    pub reference: LoadedRepoInfo,
    /// Decoded text files in tree order
    pub files: Vec<RepoFile>,
    /// Most recent commits, newest first
    pub commits: Vec<CommitRecord>,
    /// GitHub cut the tree listing short
    pub truncated: bool,
}

/// Fetches repositories through a [`GitHubClient`]
pub struct RepoIngestor<'a> {
    github: &'a GitHubClient,
    max_files: usize,
    commit_count: usize,
}

impl<'a> RepoIngestor<'a> {
    pub fn new(github: &'a GitHubClient, limits: &Limits) -> Self {
        Self {
            github,
            max_files: limits.max_files,
            commit_count: limits.commit_count,
        }
    }

    /// Loads `url`.
    ///
    /// The URL is validated before any request is made. Metadata comes first; commits and the
    /// recursive tree are then fetched together, and finally every selected blob at once. Blobs
    /// that fail to fetch or decode are left out without failing the load.
    pub async fn ingest(&self, url: &str) -> Result<IngestedRepository> {
        let slug = parse_repo_url(url)?;
        info!("Loading {}", slug);

        let details = self.github.get_repository(&slug).await?;
        let branch = details.default_branch.ok_or_else(|| {
            CopilotError::validation(format!("{} has no default branch; is it empty?", slug))
        })?;

        let (commits, tree) = tokio::join!(
            self.github.list_commits(&slug, &branch, self.commit_count),
            self.github.get_tree(&slug, &branch),
        );
        let commits = commits.map_err(details_error)?;
        let tree = tree.map_err(details_error)?;

        if tree.truncated {
            warn!(
                "Tree of {} was truncated by GitHub; analyzing the first {} files",
                slug, self.max_files
            );
        }

        let selected = select_files(&tree.tree, self.max_files);
        debug!("Fetching {} of {} tree entries", selected.len(), tree.tree.len());

        let fetches = selected.iter().map(|entry| self.fetch_file(entry));
        let files: Vec<RepoFile> = join_all(fetches).await.into_iter().flatten().collect();

        info!(
            "Loaded {} with {} files and {} commits",
            slug,
            files.len(),
            commits.len()
        );

        Ok(IngestedRepository {
            reference: LoadedRepoInfo {
                owner: slug.owner,
                repo: slug.repo,
                default_branch: branch,
                url: url.to_string(),
            },
            files,
            commits,
            truncated: tree.truncated,
        })
    }

    async fn fetch_file(&self, entry: &TreeEntry) -> Option<RepoFile> {
        let url = entry.url.as_deref()?;
        let blob = match self.github.get_blob(url).await {
            Ok(blob) => blob,
            Err(e) => {
                debug!("Skipping {}: {}", entry.path, e);
                return None;
            }
        };

        match decode_blob(&blob) {
            Ok(Some(content)) => Some(RepoFile {
                path: entry.path.clone(),
                content,
                mode: entry.mode.clone(),
            }),
            Ok(None) => {
                debug!("Skipping {}: unsupported encoding {}", entry.path, blob.encoding);
                None
            }
            Err(e) => {
                debug!("Skipping {}: {}", entry.path, e);
                None
            }
        }
    }
}

/// Blob entries that are not binary, in tree order, capped to `max_files`
pub fn select_files(tree: &[TreeEntry], max_files: usize) -> Vec<&TreeEntry> {
    tree.iter()
        .filter(|entry| entry.is_blob() && !is_binary(&entry.path))
        .take(max_files)
        .collect()
}

/// Decodes a base64 blob into text.
///
/// Returns `Ok(None)` for any other encoding. Line breaks inside the payload are ignored and
/// invalid UTF-8 is replaced.
pub fn decode_blob(blob: &Blob) -> Result<Option<String>> {
    if blob.encoding != "base64" {
        return Ok(None);
    }
    let compact: String = blob
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn details_error(err: CopilotError) -> CopilotError {
    match err {
        CopilotError::GitHubApi { status, .. } => CopilotError::GitHubApi {
            status,
            message: DETAILS_ERROR.into(),
        },
        CopilotError::RateLimited(_) | CopilotError::RepoNotFound(_) | CopilotError::Json(_) => {
            CopilotError::GitHubApi {
                status: 0,
                message: DETAILS_ERROR.into(),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: &str) -> TreeEntry {
        TreeEntry {
            path: path.into(),
            mode: "100644".into(),
            kind: kind.into(),
            sha: "0".into(),
            url: Some(format!("https://api.github.com/blobs/{}", path)),
        }
    }

    #[test]
    fn test_select_files_filters_and_caps() {
        let tree = vec![
            entry("src", "tree"),
            entry("logo.png", "blob"),
            entry("a.rs", "blob"),
            entry("b.rs", "blob"),
            entry("c.rs", "blob"),
        ];
        let picked: Vec<&str> = select_files(&tree, 2).iter().map(|e| e.path.as_str()).collect();
        assert_eq!(picked, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn test_decode_blob_strips_line_breaks() {
        let blob = Blob {
            content: "SGVsbG8g\nV29ybGQh\n".into(),
            encoding: "base64".into(),
        };
        assert_eq!(decode_blob(&blob).unwrap().as_deref(), Some("Hello World!"));
    }

    #[test]
    fn test_decode_blob_other_encoding() {
        let blob = Blob {
            content: "plain".into(),
            encoding: "utf-8".into(),
        };
        assert_eq!(decode_blob(&blob).unwrap(), None);
    }

    #[test]
    fn test_decode_blob_invalid_payload() {
        let blob = Blob {
            content: "@@@".into(),
            encoding: "base64".into(),
        };
        assert!(decode_blob(&blob).is_err());
    }
}
