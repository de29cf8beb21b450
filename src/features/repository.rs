use crate::config::Limits;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::ingest::{IngestedRepository, RepoIngestor};
use crate::workspace::Workspace;

/// Ingests `url` and makes it the loaded repository.
///
/// Nothing in the workspace changes when the ingestion fails.
pub async fn load(
    workspace: &mut Workspace,
    github: &GitHubClient,
    limits: &Limits,
    url: &str,
) -> Result<IngestedRepository> {
    let ingested = RepoIngestor::new(github, limits).ingest(url).await?;
    workspace.record_load(&ingested)?;
    Ok(ingested)
}

