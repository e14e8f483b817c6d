use log::info;
use std::sync::Arc;

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::Result;
use crate::output::ProjectProgress;
use crate::report::MigrationReport;

use super::client::{BitbucketClient, ClientSettings, RetryPolicy};
use super::scanner::{ProjectScanner, RepositorySource};

/// Bitbucket migration progress provider.
///
/// Scans the configured projects one after another, probing each project's
/// repositories concurrently, and folds the per-project counts into a
/// [`MigrationReport`].
pub struct BitbucketProvider<S = BitbucketClient> {
    scanner: ProjectScanner<S>,
    projects: Vec<String>,
    migration_label: String,
}

impl BitbucketProvider<BitbucketClient> {
    /// Creates a provider talking to the Bitbucket server named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL is
    /// invalid.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let settings = ClientSettings {
            retry: RetryPolicy {
                max_attempts: config.scan.max_attempts,
                backoff_factor: config.backoff_factor(),
            },
            request_timeout: config.request_timeout(),
            migration_label: config.scan.migration_label.clone(),
        };
        let client = BitbucketClient::new(&config.bitbucket.base_url, credentials, settings)?;

        Ok(Self::with_source(
            Arc::new(client),
            config.bitbucket.projects.clone(),
            config.scan.concurrency,
            config.scan.migration_label.clone(),
        ))
    }
}

impl<S: RepositorySource> BitbucketProvider<S> {
    pub fn with_source(
        source: Arc<S>,
        projects: Vec<String>,
        concurrency: usize,
        migration_label: String,
    ) -> Self {
        Self {
            scanner: ProjectScanner::new(source, concurrency),
            projects,
            migration_label,
        }
    }

    /// Collects migration progress for every configured project.
    ///
    /// Projects are scanned strictly in order, each finishing before the next
    /// starts. A progress line is printed to stderr as each project completes.
    ///
    /// # Errors
    ///
    /// Fails on the first project whose listing or any repository probe
    /// fails; no partial report is returned.
    pub async fn collect_report(&self) -> Result<MigrationReport> {
        info!("Collecting migration data for {} projects", self.projects.len());

        let mut report = MigrationReport::new();

        for project_key in &self.projects {
            let progress = ProjectProgress::start(project_key);
            let summary = match self.scanner.scan(project_key, progress.bar()).await {
                Ok(summary) => summary,
                Err(e) => {
                    progress.fail(project_key);
                    return Err(e);
                }
            };
            progress.finish(project_key, &summary, &self.migration_label);

            report.record(project_key, summary);
        }

        info!(
            "Scanned {} repositories, {} archived with a migration label",
            report.total_repositories(),
            report.total_archived_with_migration_label()
        );

        Ok(report)
    }
}
