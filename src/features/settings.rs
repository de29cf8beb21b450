use crate::error::{CopilotError, Result};
use crate::workspace::Workspace;
use log::info;

/// Saves a personal access token
pub fn set_token(workspace: &mut Workspace, token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(CopilotError::validation("Token cannot be empty"));
    }
    workspace.set_token(token)
}

/// Forgets the saved token, returning whether one was saved
pub fn clear_token(workspace: &mut Workspace) -> Result<bool> {
    workspace.clear_token()
}

/// Every application key as pretty JSON
pub fn export(workspace: &Workspace) -> Result<String> {
    workspace.store().export()
}

/// Restores an exported document, returning the number of keys written
pub fn import(workspace: &mut Workspace, json: &str) -> Result<usize> {
    let written = workspace.store_mut().import(json)?;
    info!("Imported {} keys", written);
    Ok(written)
}

/// Deletes all application data, returning the number of keys removed
pub fn erase(workspace: &mut Workspace) -> Result<usize> {
    let removed = workspace.store_mut().clear_namespace()?;
    info!("Erased {} keys", removed);
    Ok(removed)
}
