use log::debug;

use super::client::BitbucketClient;
use crate::error::Result;

/// Migration status of one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeOutcome {
    pub archived: bool,
    /// Always `false` for repositories that are not archived
    pub has_migration_label: bool,
}

impl ProbeOutcome {
    pub fn is_migrated(&self) -> bool {
        self.archived && self.has_migration_label
    }
}

/// Whether any label contains `marker`, ignoring case.
pub fn has_migration_label<S: AsRef<str>>(labels: &[S], marker: &str) -> bool {
    let marker = marker.to_lowercase();
    labels
        .iter()
        .any(|label| label.as_ref().to_lowercase().contains(&marker))
}

impl BitbucketClient {
    /// Probe a repository's archived flag and, only when archived, its labels.
    ///
    /// Non-archived repositories cost exactly one request.
    pub async fn probe_repository(&self, project_key: &str, repo_slug: &str) -> Result<ProbeOutcome> {
        let archived = self.is_archived(project_key, repo_slug).await?;
        if !archived {
            return Ok(ProbeOutcome::default());
        }

        let labels = self.labels(project_key, repo_slug).await?;
        let outcome = ProbeOutcome {
            archived,
            has_migration_label: has_migration_label(&labels, self.migration_label()),
        };
        debug!("{project_key}/{repo_slug}: {outcome:?} (labels: {labels:?})");

        Ok(outcome)
    }
}
