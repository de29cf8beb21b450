use crate::error::{CopilotError, Result};
use crate::llm::flows::{self, EditedCode};
use crate::llm::ChatModel;
use crate::models::RepoFile;
use crate::store::keys;
use crate::workspace::Workspace;

fn loaded_file(workspace: &Workspace, path: &str) -> Result<RepoFile> {
    workspace.require_repo()?;
    workspace
        .file(path)
        .ok_or_else(|| CopilotError::validation(format!("{} is not among the loaded files", path)))
}

/// Explains a loaded file, optionally answering `question` about it
pub async fn explain(
    workspace: &Workspace,
    model: &dyn ChatModel,
    path: &str,
    question: Option<&str>,
) -> Result<String> {
    let file = loaded_file(workspace, path)?;
    flows::explain_code(model, &file.content, question).await
}

/// Proposes an edit of a loaded file. Nothing is stored.
pub async fn edit(
    workspace: &Workspace,
    model: &dyn ChatModel,
    path: &str,
    instruction: &str,
) -> Result<EditedCode> {
    if instruction.trim().is_empty() {
        return Err(CopilotError::validation("Edit instruction cannot be empty"));
    }
    let file = loaded_file(workspace, path)?;
    flows::edit_code(model, &file.content, instruction).await
}

/// Replaces the stored content of a loaded file
pub fn apply(workspace: &mut Workspace, path: &str, content: &str) -> Result<()> {
    let mut files = workspace.files();
    let file = files
        .iter_mut()
        .find(|f| f.path == path)
        .ok_or_else(|| CopilotError::validation(format!("{} is not among the loaded files", path)))?;
    file.content = content.to_string();
    workspace.store_mut().set(keys::REPO_FILES, &files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestedRepository;
    use crate::models::LoadedRepoInfo;
    use crate::store::{LocalStore, DEFAULT_QUOTA_BYTES};
    use crate::testing::ScriptedModel;
    use tempfile::TempDir;

    fn workspace(dir: &TempDir) -> Workspace {
        let mut ws = Workspace::new(LocalStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap(), 5);
        ws.record_load(&IngestedRepository {
            reference: LoadedRepoInfo {
                owner: "o".into(),
                repo: "r".into(),
                default_branch: "main".into(),
                url: "https://github.com/o/r".into(),
            },
            files: vec![RepoFile {
                path: "src/lib.rs".into(),
                content: "pub fn add(a: i32, b: i32) -> i32 { a + b }".into(),
                mode: "100644".into(),
            }],
            commits: vec![],
            truncated: false,
        })
        .unwrap();
        ws
    }

    #[tokio::test]
    async fn test_edit_then_apply() {
        let dir = TempDir::new().unwrap();
        let mut ws = workspace(&dir);
        let model = ScriptedModel::new(r#"{"editedCode": "pub fn add(a: i64, b: i64) -> i64 { a + b }"}"#);

        let edited = edit(&ws, &model, "src/lib.rs", "use i64").await.unwrap();
        assert!(model.last_prompt().contains("pub fn add(a: i32"));
        assert_eq!(ws.file("src/lib.rs").unwrap().content, "pub fn add(a: i32, b: i32) -> i32 { a + b }");

        apply(&mut ws, "src/lib.rs", &edited.edited_code).unwrap();
        assert!(ws.file("src/lib.rs").unwrap().content.contains("i64"));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let model = ScriptedModel::new("x");
        let err = explain(&ws, &model, "missing.rs", None).await.unwrap_err();
        assert!(matches!(err, CopilotError::Validation(_)));
        assert_eq!(model.calls(), 0);
    }
}
