//! Terminal rendering for the CLI.
//!
//! Tables are drawn with `comfy-table`: the processed preview grid, the
//! inspection summary, the batch summary and the recent-files list.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table as Grid};
use std::path::PathBuf;

use crate::models::{CellValue, Table};
use crate::parser::delimited::format_delimiter;
use crate::transform::{BatchReport, FileOutcome, Inspection, TransformReport};

/// Render the first `rows` rows of `table`, with row numbers.
pub fn render_preview(table: &Table, rows: usize) -> String {
    let mut grid = styled_grid();

    let mut header = vec![header_cell("#")];
    header.extend(table.columns().iter().map(|c| header_cell(&c.name)));
    grid.set_header(header);

    for (i, row) in table.rows().take(rows).enumerate() {
        let mut cells = vec![dim_cell(i)];
        cells.extend(row.into_iter().map(value_cell));
        grid.add_row(cells);
    }

    grid.to_string()
}

/// One-line summary under the preview grid.
pub fn render_report(report: &TransformReport, row_count: usize) -> String {
    let mut out = format!("{} rows, sample column '{}'", row_count, report.sample_column);
    if !report.dropped_columns.is_empty() {
        out.push_str(&format!(", dropped: {}", report.dropped_columns.join(", ")));
    }
    out
}

/// Inspection as a key/value grid.
pub fn render_inspection(inspection: &Inspection) -> String {
    let mut grid = styled_grid();
    grid.set_header(vec![header_cell("Property"), header_cell("Value")]);

    grid.add_row(vec![Cell::new("Format"), Cell::new(inspection.format)]);
    if let Some(info) = &inspection.csv_info {
        grid.add_row(vec![Cell::new("Encoding"), Cell::new(&info.encoding)]);
        grid.add_row(vec![Cell::new("Delimiter"), Cell::new(format_delimiter(info.delimiter))]);
    }
    grid.add_row(vec![Cell::new("Rows"), Cell::new(inspection.row_count)]);
    grid.add_row(vec![Cell::new("Columns"), Cell::new(inspection.columns.join(", "))]);

    let samples = match inspection.sample_columns.split_first() {
        Some((first, rest)) if rest.is_empty() => Cell::new(first),
        Some((first, rest)) => Cell::new(format!("{} (drops {})", first.trim(), rest.len())),
        None => Cell::new("none").fg(Color::Red),
    };
    grid.add_row(vec![Cell::new("Sample column"), samples]);

    grid.to_string()
}

/// Per-file outcome of a queue run.
pub fn render_batch(report: &BatchReport) -> String {
    let mut grid = styled_grid();
    grid.set_header(vec![
        header_cell("Input"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Output / Error"),
    ]);

    for outcome in &report.outcomes {
        let row = match outcome {
            FileOutcome::Saved(done) => vec![
                Cell::new(done.input.display()),
                Cell::new("ok").fg(Color::Green),
                Cell::new(done.row_count).set_alignment(CellAlignment::Right),
                Cell::new(done.output.display()),
            ],
            FileOutcome::Failed(failed) => vec![
                Cell::new(failed.input.display()),
                Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold),
                dim_cell("-"),
                Cell::new(&failed.error),
            ],
        };
        grid.add_row(row);
    }

    grid.to_string()
}

/// Numbered recent-files list.
pub fn render_recent(entries: &[PathBuf]) -> String {
    if entries.is_empty() {
        return "No recent files".to_string();
    }

    let mut grid = styled_grid();
    grid.set_header(vec![header_cell("#"), header_cell("File")]);
    for (i, path) in entries.iter().enumerate() {
        grid.add_row(vec![dim_cell(i), Cell::new(path.display())]);
    }
    grid.to_string()
}

fn styled_grid() -> Grid {
    let mut grid = Grid::new();
    grid.load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS);
    grid
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn value_cell(value: &CellValue) -> Cell {
    match value {
        CellValue::Empty => dim_cell(""),
        CellValue::Int(_) | CellValue::Float(_) => Cell::new(value).set_alignment(CellAlignment::Right),
        _ => Cell::new(value),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
