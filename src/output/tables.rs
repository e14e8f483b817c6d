use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use crate::report::{MigrationReport, ProjectSummary};

/// Per-project migration table, one row per project plus a totals row.
pub fn render_summary(report: &MigrationReport) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["Project", "Repositories", "Migrated", "Progress"]
                .into_iter()
                .map(|label| Cell::new(label).fg(TableColor::Cyan)),
        );

    for (project_key, summary) in report.by_project() {
        table.add_row(vec![
            Cell::new(project_key),
            Cell::new(summary.total_repository).set_alignment(CellAlignment::Right),
            Cell::new(summary.total_repository_migrated).set_alignment(CellAlignment::Right),
            progress_cell(summary),
        ]);
    }

    let totals = ProjectSummary {
        total_repository: report.total_repositories(),
        total_repository_migrated: report.total_archived_with_migration_label(),
    };
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(totals.total_repository).set_alignment(CellAlignment::Right),
        Cell::new(totals.total_repository_migrated).set_alignment(CellAlignment::Right),
        progress_cell(&totals),
    ]);

    table.to_string()
}

fn migrated_percentage(summary: &ProjectSummary) -> f64 {
    if summary.total_repository == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = summary.total_repository_migrated as f64 / summary.total_repository as f64;
    rate * 100.0
}

fn progress_cell(summary: &ProjectSummary) -> Cell {
    let rate = migrated_percentage(summary);
    let text = format!("{rate:.1}%");
    if rate >= 80.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if rate >= 30.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}
