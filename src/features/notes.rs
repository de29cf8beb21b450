use crate::context::note_context;
use crate::error::{CopilotError, Result};
use crate::llm::{flows, ChatModel};
use crate::models::Note;
use crate::workspace::Workspace;

/// Generates and stores the repository note for the loaded repository.
///
/// The stored note is only replaced once the model has answered.
pub async fn generate(workspace: &mut Workspace, model: &dyn ChatModel) -> Result<String> {
    let reference = workspace.require_repo()?;
    let files = workspace.files();
    if files.is_empty() {
        return Err(CopilotError::validation(
            "Repository context not found. Please load a repository first.",
        ));
    }

    let note = flows::generate_repo_note(model, &reference.url, &note_context(&files)).await?;
    workspace.set_generated_note(&note)?;
    Ok(note)
}

/// Saves a new note at the top of the list
pub fn add(workspace: &mut Workspace, title: &str, content: &str, tags: &str) -> Result<Note> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(CopilotError::validation("Title and content cannot be empty."));
    }

    let note = Note::new(title, content, tags);
    let mut notes = workspace.notes();
    notes.insert(0, note.clone());
    workspace.set_notes(&notes)?;
    Ok(note)
}

/// All notes, newest first
pub fn list(workspace: &Workspace) -> Vec<Note> {
    workspace.notes()
}

/// Deletes the note with `id`, returning whether one was removed
pub fn delete(workspace: &mut Workspace, id: &str) -> Result<bool> {
    let mut notes = workspace.notes();
    let before = notes.len();
    notes.retain(|n| n.id != id);
    if notes.len() == before {
        return Ok(false);
    }
    workspace.set_notes(&notes)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestedRepository;
    use crate::models::{LoadedRepoInfo, RepoFile};
    use crate::store::{LocalStore, DEFAULT_QUOTA_BYTES};
    use crate::testing::ScriptedModel;
    use tempfile::TempDir;

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(LocalStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap(), 5)
    }

    fn load_repo(ws: &mut Workspace) {
        ws.record_load(&IngestedRepository {
            reference: LoadedRepoInfo {
                owner: "octocat".into(),
                repo: "Hello-World".into(),
                default_branch: "master".into(),
                url: "https://github.com/octocat/Hello-World".into(),
            },
            files: vec![RepoFile {
                path: "README".into(),
                content: "Hello World!".into(),
                mode: "100644".into(),
            }],
            commits: vec![],
            truncated: false,
        })
        .unwrap();
    }

    #[test]
    fn test_add_list_delete() {
        let dir = TempDir::new().unwrap();
        let mut ws = workspace(&dir);

        let first = add(&mut ws, "Standup", "Ship the release", "team, release").unwrap();
        let second = add(&mut ws, "Idea", "Cache the tree", "").unwrap();
        assert_eq!(first.tags, vec!["team", "release"]);

        let titles: Vec<String> = list(&ws).into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Idea", "Standup"]);

        assert!(delete(&mut ws, &second.id).unwrap());
        assert!(!delete(&mut ws, &second.id).unwrap());
        assert_eq!(list(&ws).len(), 1);
    }

    #[test]
    fn test_empty_title_rejected() {
        let dir = TempDir::new().unwrap();
        let mut ws = workspace(&dir);
        assert!(matches!(add(&mut ws, "  ", "body", ""), Err(CopilotError::Validation(_))));
        assert!(list(&ws).is_empty());
    }

    #[tokio::test]
    async fn test_generate_needs_files() {
        let dir = TempDir::new().unwrap();
        let mut ws = workspace(&dir);
        let model = ScriptedModel::new("# Note");
        assert!(matches!(
            generate(&mut ws, &model).await,
            Err(CopilotError::NoRepoLoaded)
        ));
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_previous_note() {
        let dir = TempDir::new().unwrap();
        let mut ws = workspace(&dir);
        load_repo(&mut ws);

        let model = ScriptedModel::new("# Hello-World\nA greeting.");
        assert_eq!(generate(&mut ws, &model).await.unwrap(), "# Hello-World\nA greeting.");
        assert!(model.last_prompt().contains("README"));

        let broken = ScriptedModel::failing("upstream unavailable");
        let err = generate(&mut ws, &broken).await.unwrap_err();
        assert!(matches!(err, CopilotError::Llm(_)));
        assert_eq!(ws.generated_note(), "# Hello-World\nA greeting.");
    }
}
