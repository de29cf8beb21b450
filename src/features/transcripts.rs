use crate::error::{CopilotError, Result};
use crate::llm::{flows, ChatModel};
use crate::models::Transcript;
use crate::workspace::Workspace;
use chrono::Utc;
use uuid::Uuid;

/// Summarises `content` and stores the transcript at the top of the list
pub async fn summarize(workspace: &mut Workspace, model: &dyn ChatModel, content: &str) -> Result<Transcript> {
    if content.trim().is_empty() {
        return Err(CopilotError::validation("Transcript content cannot be empty."));
    }

    let summary = flows::summarize_transcript(model, content).await?;
    let transcript = Transcript {
        id: Uuid::new_v4().to_string(),
        original_content: content.to_string(),
        summary: summary.summary,
        action_items: summary.action_items,
        created_at: Utc::now().timestamp_millis(),
    };

    let mut all = workspace.transcripts();
    all.insert(0, transcript.clone());
    workspace.set_transcripts(&all)?;
    Ok(transcript)
}

pub fn list(workspace: &Workspace) -> Vec<Transcript> {
    workspace.transcripts()
}

/// Deletes the transcript with `id`, returning whether one was removed
pub fn delete(workspace: &mut Workspace, id: &str) -> Result<bool> {
    let mut all = workspace.transcripts();
    let before = all.len();
    all.retain(|t| t.id != id);
    if all.len() == before {
        return Ok(false);
    }
    workspace.set_transcripts(&all)?;
    Ok(true)
}
