use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{failure, highlight, muted, pending, success};
use crate::report::ProjectSummary;

/// Progress for one project scan, drawn on stderr.
///
/// The bar is hidden when stderr is not a terminal; the completion line is
/// always printed.
pub struct ProjectProgress {
    pb: ProgressBar,
}

impl ProjectProgress {
    pub fn start(project_key: &str) -> Self {
        let pb = ProgressBar::new(0);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner} {msg} [{bar:30}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_message(pending(format!("Scanning {project_key}")).to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { pb }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.pb
    }

    pub fn finish(self, project_key: &str, summary: &ProjectSummary, migration_label: &str) {
        self.pb.finish_and_clear();
        eprintln!(
            "{} {}",
            success("✓"),
            completion_line(project_key, summary, migration_label)
        );
    }

    pub fn fail(self, project_key: &str) {
        self.pb.abandon_with_message(
            failure(format!("Scanning {project_key} failed ✗")).to_string(),
        );
    }
}

fn completion_line(project_key: &str, summary: &ProjectSummary, migration_label: &str) -> String {
    format!(
        "{} {}, {} {}, {} {}",
        muted("Project:"),
        highlight(project_key),
        muted("Total Repositories:"),
        summary.total_repository,
        muted(format!("Archived Repositories with \"{migration_label}\" label:")),
        summary.total_repository_migrated
    )
}
