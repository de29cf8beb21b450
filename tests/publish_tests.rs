use gitorbit::features::publish;
use gitorbit::models::FileEncoding;
use gitorbit::GitHubClient;
use mockito::{Matcher, Server};
use std::fs;
use tempfile::TempDir;

mod common;
use common::test_helpers::*;

#[tokio::test]
async fn test_stage_directory_then_publish() {
    setup_test_logger();
    let data = TempDir::new().unwrap();
    let mut workspace = test_workspace(&data);

    let source = TempDir::new().unwrap();
    let project_dir = source.path().join("orbit-demo");
    fs::create_dir_all(project_dir.join("src")).unwrap();
    fs::write(project_dir.join("Cargo.toml"), "[package]\nname = \"orbit-demo\"\n").unwrap();
    fs::write(project_dir.join("src/main.rs"), "fn main() {}\n").unwrap();
    fs::write(project_dir.join("icon.ico"), [0u8, 0, 1, 0]).unwrap();

    let staged = publish::stage_directory(&mut workspace, &project_dir).unwrap();
    assert_eq!(staged.name, "orbit-demo");
    assert_eq!(staged.files.len(), 3);
    let icon = staged.files.iter().find(|f| f.path == "icon.ico").unwrap();
    assert_eq!(icon.encoding, FileEncoding::Base64);

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/user/repos")
        .match_body(Matcher::PartialJsonString(r#"{"name": "orbit-demo"}"#.into()))
        .with_status(201)
        .with_body(
            r#"{"name": "orbit-demo", "owner": {"login": "octocat"},
                "html_url": "https://github.com/octocat/orbit-demo"}"#,
        )
        .create_async()
        .await;
    let base64_blob = server
        .mock("POST", "/repos/octocat/orbit-demo/git/blobs")
        .match_body(Matcher::PartialJsonString(r#"{"encoding": "base64"}"#.into()))
        .with_status(201)
        .with_body(r#"{"sha": "b64"}"#)
        .expect(1)
        .create_async()
        .await;
    let text_blobs = server
        .mock("POST", "/repos/octocat/orbit-demo/git/blobs")
        .match_body(Matcher::PartialJsonString(r#"{"encoding": "utf-8"}"#.into()))
        .with_status(201)
        .with_body(r#"{"sha": "txt"}"#)
        .expect(2)
        .create_async()
        .await;
    let tree = server
        .mock("POST", "/repos/octocat/orbit-demo/git/trees")
        .with_status(201)
        .with_body(r#"{"sha": "tree"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/repos/octocat/orbit-demo/git/commits")
        .with_status(201)
        .with_body(r#"{"sha": "commit"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/repos/octocat/orbit-demo/git/refs")
        .with_status(422)
        .with_body(r#"{"message": "Reference already exists"}"#)
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", "/repos/octocat/orbit-demo/git/refs/heads/main")
        .match_body(Matcher::PartialJsonString(r#"{"sha": "commit"}"#.into()))
        .with_status(200)
        .with_body(r#"{"ref": "refs/heads/main"}"#)
        .create_async()
        .await;

    let github = GitHubClient::with_base(&server.url(), Some("ghp_test".into())).unwrap();
    let url = publish::publish_staged(&mut workspace, &github, None, false)
        .await
        .unwrap();

    assert_eq!(url, "https://github.com/octocat/orbit-demo");
    base64_blob.assert_async().await;
    text_blobs.assert_async().await;
    tree.assert_async().await;
    patch.assert_async().await;
    assert!(workspace.local_project().is_none());
}

#[tokio::test]
async fn test_failed_create_keeps_staged_project() {
    let data = TempDir::new().unwrap();
    let mut workspace = test_workspace(&data);
    let source = TempDir::new().unwrap();
    fs::write(source.path().join("notes.txt"), "hello").unwrap();
    publish::stage_directory(&mut workspace, source.path()).unwrap();

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/user/repos")
        .with_status(422)
        .with_body(r#"{"message": "Repository creation failed.", "errors": [{"message": "name already exists on this account"}]}"#)
        .create_async()
        .await;

    let github = GitHubClient::with_base(&server.url(), Some("ghp_test".into())).unwrap();
    let err = publish::publish_staged(&mut workspace, &github, None, false)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("name already exists"));
    assert!(workspace.local_project().is_some());
}
