use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gitorbit(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitorbit").unwrap();
    cmd.env("GITORBIT_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("HOME", home.path())
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_invalid_url_is_rejected() {
    let home = TempDir::new().unwrap();
    gitorbit(&home)
        .args(["load", "https://example.com/octocat/Hello-World"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid GitHub repository URL"));
}

#[test]
fn test_status_without_repository() {
    let home = TempDir::new().unwrap();
    gitorbit(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No repository loaded"))
        .stdout(predicate::str::contains("GitHub token"));
}

#[test]
fn test_notes_persist_between_runs() {
    let home = TempDir::new().unwrap();
    gitorbit(&home)
        .args(["notes", "add", "Release", "Tag v1.0 on Friday", "--tags", "release, team"])
        .assert()
        .success();
    gitorbit(&home)
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Release"))
        .stdout(predicate::str::contains("release, team"));
}

#[test]
fn test_export_erase_import() {
    let home = TempDir::new().unwrap();
    let backup = home.path().join("backup.json");
    gitorbit(&home)
        .args(["token", "set", "--value", "ghp_cli"])
        .assert()
        .success();
    gitorbit(&home)
        .args(["data", "export", "--output"])
        .arg(&backup)
        .assert()
        .success();
    gitorbit(&home)
        .args(["data", "erase", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Erased 1 keys"));
    gitorbit(&home)
        .args(["data", "import"])
        .arg(&backup)
        .assert()
        .success();
    gitorbit(&home)
        .args(["data", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gitorbit_github_pat"));
}

#[test]
fn test_chat_needs_loaded_repository() {
    let home = TempDir::new().unwrap();
    gitorbit(&home)
        .args(["chat", "What does this do?"])
        .env("LLM_API_KEY", "test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No repository loaded"));
}

#[test]
fn test_visualize_needs_loaded_repository() {
    let home = TempDir::new().unwrap();
    gitorbit(&home)
        .arg("visualize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No repository loaded"));
}
