//! Repository health snapshots with a one-hour cache.

use crate::cache::{Timestamped, TtlCache};
use crate::context::HealthMetrics;
use crate::error::{CopilotError, Result};
use crate::github::GitHubClient;
use crate::llm::{flows, ChatModel};
use crate::models::LoadedRepoInfo;
use crate::store::keys;
use crate::workspace::Workspace;
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metrics and the model's reading of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub metrics: HealthMetrics,
    /// Markdown report
    pub insights: String,
}

/// A report together with when it was produced
pub type HealthSnapshot = Timestamped<HealthReport>;

/// Whether a snapshot came from the cache or was just computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Cache,
    Fresh,
}

/// Computes and caches health snapshots
pub struct HealthService<'a> {
    github: &'a GitHubClient,
    model: &'a dyn ChatModel,
    cache: TtlCache,
    token_ceiling: usize,
}

impl<'a> HealthService<'a> {
    pub fn new(
        github: &'a GitHubClient,
        model: &'a dyn ChatModel,
        ttl: Duration,
        token_ceiling: usize,
    ) -> Self {
        Self {
            github,
            model,
            cache: TtlCache::new(ttl),
            token_ceiling,
        }
    }

    /// Returns the snapshot of `reference` over the last `range_days` days.
    ///
    /// A cached snapshot younger than the TTL is returned without any request unless `force`
    /// is set. Otherwise the four statistics endpoints are queried together; GitHub answering
    /// 202 for either stats endpoint surfaces as [`CopilotError::StatsPending`] and
    /// nothing is cached.
    pub async fn snapshot(
        &self,
        workspace: &mut Workspace,
        reference: &LoadedRepoInfo,
        range_days: u32,
        force: bool,
    ) -> Result<(HealthSnapshot, SnapshotSource)> {
        let key = keys::health(&reference.url, range_days);
        if !force {
            if let Some(cached) = self.cache.get::<HealthReport>(workspace.store(), &key) {
                info!("Loaded health of {} from cache", reference.full_name());
                return Ok((cached, SnapshotSource::Cache));
            }
        }

        let slug = reference.slug();
        let since = (Utc::now() - ChronoDuration::days(i64::from(range_days)))
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let (activity, contributors, issues, pulls) = tokio::join!(
            self.github.commit_activity(&slug),
            self.github.contributors(&slug),
            self.github.issues(&slug, &since),
            self.github.pulls(&slug),
        );
        if matches!(activity, Err(CopilotError::StatsPending))
            || matches!(contributors, Err(CopilotError::StatsPending))
        {
            return Err(CopilotError::StatsPending);
        }
        let (activity, contributors) = (activity?, contributors?);
        let (issues, pulls) = (issues?, pulls?);

        let metrics = HealthMetrics::from_raw(&activity, &contributors, &issues, &pulls);
        let insights =
            flows::analyze_repo_health(self.model, &reference.url, &metrics, self.token_ceiling).await?;

        let snapshot = self
            .cache
            .put(workspace.store_mut(), &key, HealthReport { metrics, insights })?;
        Ok((snapshot, SnapshotSource::Fresh))
    }
}
