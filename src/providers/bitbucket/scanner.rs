use async_trait::async_trait;
use indicatif::ProgressBar;
use log::debug;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::client::BitbucketClient;
use super::prober::ProbeOutcome;
use super::types::Repository;
use crate::error::{Result, TrackerError};
use crate::report::ProjectSummary;

/// Where a scan gets its repositories and probe results from.
#[async_trait]
pub trait RepositorySource: Send + Sync + 'static {
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<Repository>>;

    async fn probe(&self, project_key: &str, repo_slug: &str) -> Result<ProbeOutcome>;
}

#[async_trait]
impl RepositorySource for BitbucketClient {
    async fn list_repositories(&self, project_key: &str) -> Result<Vec<Repository>> {
        BitbucketClient::list_repositories(self, project_key).await
    }

    async fn probe(&self, project_key: &str, repo_slug: &str) -> Result<ProbeOutcome> {
        self.probe_repository(project_key, repo_slug).await
    }
}

/// Probes every repository of a project with a bounded number in flight.
pub struct ProjectScanner<S> {
    source: Arc<S>,
    concurrency: usize,
}

impl<S: RepositorySource> ProjectScanner<S> {
    pub fn new(source: Arc<S>, concurrency: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// List a project's repositories, then probe them concurrently.
    ///
    /// Results are drained in completion order. The first failed probe aborts
    /// the scan; dropping the `JoinSet` cancels the probes still running.
    pub async fn scan(&self, project_key: &str, progress: &ProgressBar) -> Result<ProjectSummary> {
        let repositories = self.source.list_repositories(project_key).await?;
        debug!(
            "Probing {} repositories of {project_key} ({} at a time)",
            repositories.len(),
            self.concurrency
        );
        progress.set_length(repositories.len() as u64);

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut probes = JoinSet::new();

        for repository in &repositories {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            let project_key = project_key.to_string();
            let repo_slug = repository.slug.clone();

            probes.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| TrackerError::Worker(e.to_string()))?;
                source.probe(&project_key, &repo_slug).await
            });
        }

        let mut migrated = 0;
        while let Some(joined) = probes.join_next().await {
            let outcome = joined.map_err(|e| TrackerError::Worker(e.to_string()))??;
            if outcome.is_migrated() {
                migrated += 1;
            }
            progress.inc(1);
        }

        Ok(ProjectSummary {
            total_repository: repositories.len(),
            total_repository_migrated: migrated,
        })
    }
}
