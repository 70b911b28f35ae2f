//! Terminal rendering of session projections.

use chemviz_core::history::HistoryStore;
use chemviz_core::projection::{ChartSeries, SummaryView, TableProjection};
use chemviz_core::session::Outcome;
use chrono::Local;
use colored::{ColoredString, Colorize};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub const BAR_WIDTH: usize = 40;
const BAR_GLYPH: &str = "█";

/// Colors a status line by how the operation ended.
pub fn status_line(outcome: &Outcome, message: &str) -> ColoredString {
    match outcome {
        Outcome::Applied => message.green(),
        Outcome::Failed(_) => message.red(),
        Outcome::Discarded | Outcome::Skipped => message.bright_black(),
    }
}

/// Past uploads, numbered from 1 in display order.
pub fn history_table(history: &HistoryStore) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header_cell("#"),
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Uploaded"),
        header_cell("Rows"),
    ]);
    for (index, entry) in history.entries().iter().enumerate() {
        let uploaded = entry
            .uploaded_at
            .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let rows = entry
            .row_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(index + 1).fg(Color::DarkGrey),
            Cell::new(entry.id),
            Cell::new(&entry.name),
            Cell::new(uploaded),
            Cell::new(rows),
        ]);
    }
    align_right(&mut table, &[0, 1, 4]);
    table
}

/// Summary cards as a two-column table.
pub fn summary_table(view: &SummaryView) -> Table {
    let mut table = styled_table();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Total records"),
        Cell::new(view.total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Avg flowrate"), Cell::new(&view.avg_flow)]);
    table.add_row(vec![Cell::new("Avg pressure"), Cell::new(&view.avg_pressure)]);
    table.add_row(vec![Cell::new("Avg temperature"), Cell::new(&view.avg_temp)]);
    if let Some(total_raw) = view.total_raw {
        table.add_row(vec![Cell::new("Rows received"), Cell::new(total_raw)]);
    }
    if let Some(invalid) = view.invalid_rows {
        let cell = if invalid > 0 {
            Cell::new(invalid).fg(Color::Yellow)
        } else {
            Cell::new(invalid)
        };
        table.add_row(vec![Cell::new("Invalid rows"), cell]);
    }
    for (label, range) in &view.ranges {
        table.add_row(vec![Cell::new(format!("{label} min/max")), Cell::new(range)]);
    }
    align_right(&mut table, &[1]);
    table
}

/// Raw dataset rows. `limit` caps the number of rows shown.
pub fn data_table(projection: &TableProjection, limit: Option<usize>) -> Table {
    let mut table = styled_table();
    table.set_header(projection.columns.iter().map(|column| header_cell(column)));
    let shown = limit.unwrap_or(projection.rows.len());
    for row in projection.rows.iter().take(shown) {
        table.add_row(row.iter().map(Cell::new));
    }
    table
}

/// Horizontal bar chart of the equipment type distribution.
///
/// The largest count spans `width` glyphs; any non-zero count gets at
/// least one.
pub fn bar_chart(series: &ChartSeries, width: usize) -> String {
    let label_width = series
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = series.values.iter().copied().max().unwrap_or(0);

    series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, &value)| {
            let bar = BAR_GLYPH.repeat(bar_length(value, max, width));
            format!("{label:<label_width$} {bar} {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bar_length(value: u64, max: u64, width: usize) -> usize {
    if max == 0 || value == 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * width as f64).round() as usize;
    scaled.max(1)
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}
