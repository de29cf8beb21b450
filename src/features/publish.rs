use crate::error::{CopilotError, Result};
use crate::filter::is_binary;
use crate::github::{GitHubClient, NewTreeEntry, RepoSlug};
use crate::llm::{flows, ChatModel};
use crate::models::{FileEncoding, LocalProject, ProjectFile};
use crate::workspace::Workspace;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use log::{info, warn};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Mode of every published file
pub const FILE_MODE: &str = "100644";

/// Branch the initial commit is pushed to
pub const DEFAULT_BRANCH: &str = "main";

/// Message of the initial commit
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from GitOrbit";

// Directory and file names skipped when staging a local directory
const IGNORE_PATTERNS: &[&str] = &[
    ".git", ".svn", ".hg",
    "node_modules", "target", "dist",
    ".vscode", ".idea", ".DS_Store", "Thumbs.db",
    "*.log", "*.tmp",
    "venv", ".venv", "__pycache__", ".pytest_cache",
];

fn should_ignore(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy().to_lowercase();
    IGNORE_PATTERNS.iter().any(|pattern| match pattern.strip_prefix("*.") {
        Some(suffix) => name.ends_with(&format!(".{}", suffix)),
        None => name == pattern.to_lowercase(),
    })
}

/// Generates a project from `prompt` and stages it under `name`
pub async fn generate(
    workspace: &mut Workspace,
    model: &dyn ChatModel,
    prompt: &str,
    name: &str,
) -> Result<LocalProject> {
    if prompt.trim().is_empty() {
        return Err(CopilotError::validation("Project description cannot be empty."));
    }
    let name = require_name(name)?;

    let generated = flows::generate_project(model, prompt).await?;
    let project = LocalProject {
        name: name.to_string(),
        files: generated
            .files
            .into_iter()
            .map(|file| ProjectFile {
                path: file.path,
                content: file.content,
                mode: FILE_MODE.to_string(),
                encoding: FileEncoding::Utf8,
            })
            .collect(),
    };
    workspace.set_local_project(&project)?;
    info!("Staged {} generated files as {}", project.files.len(), project.name);
    Ok(project)
}

/// Stages every file below `dir`, named after the directory.
///
/// Binary files are base64-encoded, everything else is read as UTF-8.
pub fn stage_directory(workspace: &mut Workspace, dir: &Path) -> Result<LocalProject> {
    let project = read_directory(dir)?;
    if project.files.is_empty() {
        return Err(CopilotError::validation(format!(
            "No files found in {}",
            dir.display()
        )));
    }
    workspace.set_local_project(&project)?;
    info!("Staged {} files from {}", project.files.len(), dir.display());
    Ok(project)
}

/// Reads `dir` into a project without storing it
pub fn read_directory(dir: &Path) -> Result<LocalProject> {
    if !dir.is_dir() {
        return Err(CopilotError::validation(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let name = dir
        .canonicalize()?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !should_ignore(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unknown path".to_string());
                warn!("Skipping {}: {}", path, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or_else(|_| entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let bytes = fs::read(entry.path())?;
        files.push(project_file(relative, bytes));
    }

    Ok(LocalProject { name, files })
}

fn project_file(path: String, bytes: Vec<u8>) -> ProjectFile {
    let binary = is_binary(&path) || content_inspector::inspect(&bytes).is_binary();
    let (content, encoding) = match String::from_utf8(bytes) {
        Ok(text) if !binary => (text, FileEncoding::Utf8),
        Ok(text) => (STANDARD.encode(text.as_bytes()), FileEncoding::Base64),
        Err(e) => (STANDARD.encode(e.as_bytes()), FileEncoding::Base64),
    };
    ProjectFile {
        path,
        content,
        mode: FILE_MODE.to_string(),
        encoding,
    }
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CopilotError::validation("Repository name cannot be empty."));
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(CopilotError::validation(format!(
            "Invalid repository name: {}",
            name
        )));
    }
    Ok(name)
}

/// Creates a repository for the token's owner and pushes `files` as its first commit.
///
/// Returns the browser URL of the new repository.
pub async fn create_and_push(
    github: &GitHubClient,
    name: &str,
    description: Option<&str>,
    private: bool,
    files: &[ProjectFile],
) -> Result<String> {
    if !github.has_token() {
        return Err(CopilotError::validation(
            "Publishing needs a GitHub token. Run `gitorbit token set` first.",
        ));
    }
    let name = require_name(name)?;
    if files.is_empty() {
        return Err(CopilotError::validation("There are no files to publish."));
    }

    let repo = github.create_repository(name, description, private).await?;
    let slug = RepoSlug {
        owner: repo.owner.login.clone(),
        repo: repo.name.clone(),
    };
    info!("Created {}, uploading {} files", slug, files.len());

    let uploads = files.iter().map(|file| {
        let slug = &slug;
        async move {
            github
                .create_blob(slug, &file.content, file.encoding.as_str())
                .await
                .map_err(|e| blob_error(&file.path, e))
        }
    });
    let mut entries = Vec::with_capacity(files.len());
    for (file, sha) in files.iter().zip(join_all(uploads).await) {
        entries.push(NewTreeEntry {
            path: file.path.clone(),
            mode: file.mode.clone(),
            kind: "blob".to_string(),
            sha: sha?,
        });
    }

    let tree = github.create_tree(&slug, &entries).await?;
    let commit = github
        .create_commit(&slug, INITIAL_COMMIT_MESSAGE, &tree, &[])
        .await?;
    github.point_branch(&slug, DEFAULT_BRANCH, &commit).await?;

    info!("Pushed {} to {}", commit, repo.html_url);
    Ok(repo.html_url)
}

fn blob_error(path: &str, error: CopilotError) -> CopilotError {
    match error {
        CopilotError::GitHubApi { status, message } => CopilotError::GitHubApi {
            status,
            message: format!("Failed to create blob for file: {}. GitHub said: {}", path, message),
        },
        other => CopilotError::GitHubApi {
            status: 0,
            message: format!("Failed to create blob for file: {}. GitHub said: {}", path, other),
        },
    }
}

/// Publishes the staged project and clears it once the push succeeded
pub async fn publish_staged(
    workspace: &mut Workspace,
    github: &GitHubClient,
    description: Option<&str>,
    private: bool,
) -> Result<String> {
    let project = workspace.local_project().ok_or_else(|| {
        CopilotError::validation(
            "No project staged. Run `gitorbit project generate` or `gitorbit project stage` first.",
        )
    })?;
    let url = create_and_push(github, &project.name, description, private, &project.files).await?;
    workspace.clear_local_project()?;
    Ok(url)
}
