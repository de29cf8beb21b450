use crate::error::{CopilotError, Result};
use crate::github::{Collaborator, GitHubClient};
use crate::workspace::Workspace;
use log::info;

fn require_token(github: &GitHubClient) -> Result<()> {
    if github.has_token() {
        Ok(())
    } else {
        Err(CopilotError::validation(
            "Managing collaborators needs a GitHub token. Run `gitorbit token set` first.",
        ))
    }
}

fn require_username(username: &str) -> Result<&str> {
    let username = username.trim().trim_start_matches('@');
    if username.is_empty() {
        return Err(CopilotError::validation("Username cannot be empty"));
    }
    Ok(username)
}

/// Collaborators of the loaded repository
pub async fn list(workspace: &Workspace, github: &GitHubClient) -> Result<Vec<Collaborator>> {
    require_token(github)?;
    let reference = workspace.require_repo()?;
    github.list_collaborators(&reference.slug()).await
}

/// Invites `username` to the loaded repository
pub async fn add(workspace: &Workspace, github: &GitHubClient, username: &str) -> Result<()> {
    require_token(github)?;
    let username = require_username(username)?;
    let reference = workspace.require_repo()?;
    github.add_collaborator(&reference.slug(), username).await?;
    info!("Invited {} to {}", username, reference.full_name());
    Ok(())
}

/// Removes `username` from the loaded repository
pub async fn remove(workspace: &Workspace, github: &GitHubClient, username: &str) -> Result<()> {
    require_token(github)?;
    let username = require_username(username)?;
    let reference = workspace.require_repo()?;
    github.remove_collaborator(&reference.slug(), username).await?;
    info!("Removed {} from {}", username, reference.full_name());
    Ok(())
}
