mod exports;
mod progress;
mod styling;
mod tables;

pub use exports::export_report;
pub use progress::ProjectProgress;
use styling::{muted, title};
use tables::render_summary;

/// Prints the archive-tally banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        title("📦 archive-tally"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Bitbucket → GitLab migration report")
    );
}

/// Prints the per-project summary table to stderr.
pub fn print_summary(report: &crate::report::MigrationReport) {
    eprintln!("{}", render_summary(report));
}
