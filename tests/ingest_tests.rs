use gitorbit::config::Limits;
use gitorbit::error::CopilotError;
use gitorbit::features::repository;
use gitorbit::GitHubClient;
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

mod common;
use common::test_helpers::*;

#[tokio::test]
async fn test_load_hello_world() {
    setup_test_logger();
    let dir = TempDir::new().unwrap();
    let mut workspace = test_workspace(&dir);
    let mut server = Server::new_async().await;

    let repo = mock_repository(&mut server, "octocat", "Hello-World", "master").await;
    let commits = mock_commits(&mut server, "octocat", "Hello-World", 30).await;
    let entries = vec![
        blob_entry(&server, "README", "readme"),
        json!({ "path": "src", "mode": "040000", "type": "tree", "sha": "src" }),
        blob_entry(&server, "src/main.rs", "main"),
        blob_entry(&server, "docs/logo.png", "logo"),
    ];
    let tree = mock_tree(&mut server, "octocat", "Hello-World", "master", entries, false).await;
    mock_blob(&mut server, "readme", "Hello World!\n").await;
    mock_blob(&mut server, "main", "fn main() {\n    println!(\"hi\");\n}\n").await;
    let logo = server.mock("GET", "/blobs/logo").expect(0).create_async().await;

    let github = GitHubClient::with_base(&server.url(), None).unwrap();
    let ingested = repository::load(
        &mut workspace,
        &github,
        &Limits::default(),
        "https://github.com/octocat/Hello-World",
    )
    .await
    .unwrap();

    repo.assert_async().await;
    commits.assert_async().await;
    tree.assert_async().await;
    logo.assert_async().await;
    assert!(!ingested.truncated);

    let reference = workspace.loaded_repo().unwrap();
    assert_eq!(reference.owner, "octocat");
    assert_eq!(reference.repo, "Hello-World");
    assert_eq!(reference.default_branch, "master");
    assert_eq!(reference.url, "https://github.com/octocat/Hello-World");

    let files = workspace.files();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["README", "src/main.rs"]);
    assert_eq!(files[0].content, "Hello World!\n");
    assert_eq!(workspace.commits().len(), 30);
    assert_eq!(workspace.history(), vec![reference]);
    assert!(workspace.chat_messages().is_empty());
}

#[tokio::test]
async fn test_failed_blob_is_left_out() {
    let dir = TempDir::new().unwrap();
    let mut workspace = test_workspace(&dir);
    let mut server = Server::new_async().await;

    mock_repository(&mut server, "octocat", "Spoon-Knife", "main").await;
    mock_commits(&mut server, "octocat", "Spoon-Knife", 3).await;
    let entries = vec![
        blob_entry(&server, "index.html", "index"),
        blob_entry(&server, "styles.css", "styles"),
    ];
    mock_tree(&mut server, "octocat", "Spoon-Knife", "main", entries, false).await;
    mock_blob(&mut server, "index", "<h1>Fork me</h1>").await;
    server
        .mock("GET", "/blobs/styles")
        .with_status(500)
        .create_async()
        .await;

    let github = GitHubClient::with_base(&server.url(), None).unwrap();
    repository::load(
        &mut workspace,
        &github,
        &Limits::default(),
        "https://github.com/octocat/Spoon-Knife",
    )
    .await
    .unwrap();

    let files = workspace.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "index.html");
}

#[tokio::test]
async fn test_file_cap() {
    let dir = TempDir::new().unwrap();
    let mut workspace = test_workspace(&dir);
    let mut server = Server::new_async().await;

    mock_repository(&mut server, "octocat", "linguist", "main").await;
    mock_commits(&mut server, "octocat", "linguist", 1).await;
    let entries: Vec<_> = (0..105)
        .map(|i| blob_entry(&server, &format!("lib/file{}.rb", i), &i.to_string()))
        .collect();
    mock_tree(&mut server, "octocat", "linguist", "main", entries, true).await;
    let blobs = server
        .mock("GET", Matcher::Regex(r"^/blobs/\d+$".to_string()))
        .with_status(200)
        .with_body(r#"{"content": "cHV0cyAnaGkn", "encoding": "base64"}"#)
        .expect(100)
        .create_async()
        .await;

    let github = GitHubClient::with_base(&server.url(), None).unwrap();
    let ingested = repository::load(
        &mut workspace,
        &github,
        &Limits::default(),
        "https://github.com/octocat/linguist",
    )
    .await
    .unwrap();

    blobs.assert_async().await;
    assert!(ingested.truncated);
    assert_eq!(workspace.files().len(), 100);
    assert_eq!(workspace.files()[0].content, "puts 'hi'");
    assert_eq!(workspace.files()[99].path, "lib/file99.rb");
}

#[tokio::test]
async fn test_invalid_url_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let mut workspace = test_workspace(&dir);
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let github = GitHubClient::with_base(&server.url(), None).unwrap();
    let err = repository::load(
        &mut workspace,
        &github,
        &Limits::default(),
        "https://gitlab.com/octocat/Hello-World",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CopilotError::InvalidRepoUrl(_)));
    any.assert_async().await;
    assert!(workspace.loaded_repo().is_none());
}

#[tokio::test]
async fn test_not_found_and_rate_limited() {
    let dir = TempDir::new().unwrap();
    let mut workspace = test_workspace(&dir);
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/octocat/missing")
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octocat/busy")
        .with_status(403)
        .with_body(r#"{"message": "API rate limit exceeded"}"#)
        .create_async()
        .await;

    let github = GitHubClient::with_base(&server.url(), None).unwrap();
    let limits = Limits::default();

    let err = repository::load(&mut workspace, &github, &limits, "https://github.com/octocat/missing")
        .await
        .unwrap_err();
    assert!(matches!(err, CopilotError::RepoNotFound(_)));
    assert!(err.is_user_actionable());

    let err = repository::load(&mut workspace, &github, &limits, "https://github.com/octocat/busy")
        .await
        .unwrap_err();
    assert!(matches!(err, CopilotError::RateLimited(_)));
    assert!(workspace.loaded_repo().is_none());
    assert!(workspace.history().is_empty());
}
