#![allow(dead_code)]

use async_trait::async_trait;
use gitorbit::error::{CopilotError, Result};
use gitorbit::llm::{ChatModel, OutputFormat, PromptMessage};
use gitorbit::store::{LocalStore, DEFAULT_QUOTA_BYTES};
use gitorbit::Workspace;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub mod test_helpers {
    use super::*;

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    pub fn test_workspace(dir: &TempDir) -> Workspace {
        Workspace::new(LocalStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap(), 5)
    }

    /// Mocks `GET /repos/{owner}/{repo}`
    pub async fn mock_repository(server: &mut ServerGuard, owner: &str, repo: &str, branch: &str) -> Mock {
        server
            .mock("GET", format!("/repos/{}/{}", owner, repo).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": repo,
                    "owner": { "login": owner },
                    "default_branch": branch,
                    "html_url": format!("https://github.com/{}/{}", owner, repo),
                    "private": false
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    /// Mocks the commit list with `count` commits
    pub async fn mock_commits(server: &mut ServerGuard, owner: &str, repo: &str, count: usize) -> Mock {
        let commits: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "sha": format!("{:040x}", i + 1),
                    "html_url": format!("https://github.com/{}/{}/commit/{:040x}", owner, repo, i + 1),
                    "commit": {
                        "message": format!("Commit number {}\n\nDetails", i + 1),
                        "author": { "name": "The Octocat", "date": "2012-03-06T23:06:50Z" }
                    }
                })
            })
            .collect();
        server
            .mock("GET", format!("/repos/{}/{}/commits", owner, repo).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!(commits).to_string())
            .create_async()
            .await
    }

    /// Tree entry whose blob URL points at the mock server
    pub fn blob_entry(server: &ServerGuard, path: &str, sha: &str) -> serde_json::Value {
        json!({
            "path": path,
            "mode": "100644",
            "type": "blob",
            "sha": sha,
            "url": format!("{}/blobs/{}", server.url(), sha)
        })
    }

    /// Mocks the recursive tree listing of `branch`
    pub async fn mock_tree(
        server: &mut ServerGuard,
        owner: &str,
        repo: &str,
        branch: &str,
        entries: Vec<serde_json::Value>,
        truncated: bool,
    ) -> Mock {
        server
            .mock("GET", format!("/repos/{}/{}/git/trees/{}", owner, repo, branch).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "sha": "root", "tree": entries, "truncated": truncated }).to_string())
            .create_async()
            .await
    }

    /// Mocks a base64 blob, wrapped at 60 characters like GitHub does
    pub async fn mock_blob(server: &mut ServerGuard, sha: &str, content: &str) -> Mock {
        let encoded = STANDARD.encode(content);
        let wrapped: Vec<String> = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        server
            .mock("GET", format!("/blobs/{}", sha).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "content": wrapped.join("\n"), "encoding": "base64" }).to_string())
            .create_async()
            .await
    }

    /// Replies with a fixed answer and counts calls
    pub struct CannedModel {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl CannedModel {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn complete(&self, _messages: &[PromptMessage], _format: OutputFormat) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(CopilotError::Llm)
        }
    }
}
