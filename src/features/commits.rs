use crate::config::Limits;
use crate::error::Result;
use crate::github::{CommitRecord, GitHubClient};
use crate::llm::{flows, ChatModel};
use crate::models::CommitExplanation;
use crate::store::keys;
use crate::workspace::Workspace;
use log::info;

/// Refetches the most recent commits of the loaded repository.
///
/// Earlier explanations are dropped along with the old list.
pub async fn refresh(
    workspace: &mut Workspace,
    github: &GitHubClient,
    limits: &Limits,
) -> Result<Vec<CommitRecord>> {
    let reference = workspace.require_repo()?;
    let commits = github
        .list_commits(&reference.slug(), &reference.default_branch, limits.commit_count)
        .await?;

    workspace.set_commits(&commits)?;
    workspace.store_mut().remove(keys::COMMIT_EXPLANATIONS)?;
    info!("Refreshed {} commits of {}", commits.len(), reference.full_name());
    Ok(commits)
}

/// Explains the commit `sha` of the loaded repository.
///
/// A previous successful explanation is reused unless `force` is set. Failures are recorded
/// next to the SHA and returned.
pub async fn explain(
    workspace: &mut Workspace,
    github: &GitHubClient,
    model: &dyn ChatModel,
    limits: &Limits,
    sha: &str,
    force: bool,
) -> Result<String> {
    let reference = workspace.require_repo()?;

    if !force {
        if let Some(known) = workspace.commit_explanations().get(sha) {
            if known.error.is_none() && !known.summary.is_empty() {
                return Ok(known.summary.clone());
            }
        }
    }

    let outcome = match github.get_commit_diff(&reference.slug(), sha).await {
        Ok(diff) => flows::explain_commit(model, &diff, limits.commit_diff_chars).await,
        Err(e) => Err(e),
    };

    let record = match &outcome {
        Ok(summary) => CommitExplanation {
            summary: summary.clone(),
            error: None,
        },
        Err(e) => CommitExplanation {
            summary: String::new(),
            error: Some(e.to_string()),
        },
    };
    workspace.save_commit_explanation(sha, record)?;
    outcome
}

/// Resolves an abbreviated SHA against the stored commits
pub fn resolve_sha(workspace: &Workspace, prefix: &str) -> Option<String> {
    let matches: Vec<String> = workspace
        .commits()
        .iter()
        .filter(|c| c.sha().starts_with(prefix))
        .map(|c| c.sha().to_string())
        .collect();
    match matches.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    }
}
