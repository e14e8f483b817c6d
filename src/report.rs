use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProjectSummary {
    pub total_repository: usize,
    pub total_repository_migrated: usize,
}

/// Migration progress across every scanned project.
///
/// Totals are only ever updated through [`MigrationReport::record`], which
/// keeps them equal to the sums over `by_project`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    total_repositories: usize,
    #[serde(rename = "total_archived_repositories_with_gitlab_label")]
    total_archived_with_migration_label: usize,
    #[serde(rename = "total_repository_by_project")]
    by_project: IndexMap<String, ProjectSummary>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one project's summary into the report.
    ///
    /// Recording the same project twice replaces its earlier summary.
    pub fn record(&mut self, project_key: &str, summary: ProjectSummary) {
        if let Some(previous) = self.by_project.insert(project_key.to_string(), summary) {
            self.total_repositories -= previous.total_repository;
            self.total_archived_with_migration_label -= previous.total_repository_migrated;
        }
        self.total_repositories += summary.total_repository;
        self.total_archived_with_migration_label += summary.total_repository_migrated;
    }

    pub fn total_repositories(&self) -> usize {
        self.total_repositories
    }

    pub fn total_archived_with_migration_label(&self) -> usize {
        self.total_archived_with_migration_label
    }

    pub fn by_project(&self) -> &IndexMap<String, ProjectSummary> {
        &self.by_project
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(total: usize, migrated: usize) -> ProjectSummary {
        ProjectSummary {
            total_repository: total,
            total_repository_migrated: migrated,
        }
    }

    #[test]
    fn test_totals_track_project_sums() {
        let mut report = MigrationReport::new();
        report.record("CORE", summary(10, 4));
        report.record("WEB", summary(3, 0));
        report.record("EMPTY", summary(0, 0));

        assert_eq!(report.total_repositories(), 13);
        assert_eq!(report.total_archived_with_migration_label(), 4);
        assert_eq!(report.by_project().len(), 3);
    }

    #[test]
    fn test_rerecording_project_replaces_summary() {
        let mut report = MigrationReport::new();
        report.record("CORE", summary(10, 4));
        report.record("CORE", summary(12, 5));

        assert_eq!(report.total_repositories(), 12);
        assert_eq!(report.total_archived_with_migration_label(), 5);
        assert_eq!(report.by_project()["CORE"], summary(12, 5));
    }

    #[test]
    fn test_json_shape() {
        let mut report = MigrationReport::new();
        report.record("XPCLOUD", summary(3, 1));
        report.record("SL", summary(2, 2));

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"total_repositories":5,"total_archived_repositories_with_gitlab_label":3,"total_repository_by_project":{"XPCLOUD":{"total_repository":3,"total_repository_migrated":1},"SL":{"total_repository":2,"total_repository_migrated":2}}}"#
        );
    }
}
