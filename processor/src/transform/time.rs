//! Time-column derivation.

use crate::error::{TransformError, TransformResult};
use crate::models::{CellValue, Column, Table};

/// Name of the derived column.
pub const TIME_COLUMN: &str = "Time";

/// Seconds per sample index.
pub const TIME_SCALE: f64 = 0.01;

/// Insert `Time = sample * 0.01` as the first column.
///
/// `sample_column` is the name returned by
/// [`super::sample::dedupe_sample_columns`]. Missing cells stay missing.
/// Any other non-numeric cell fails the whole step and leaves the table as it was.
pub fn derive_time_column(table: &mut Table, sample_column: Option<&str>) -> TransformResult<()> {
    let name = sample_column.ok_or(TransformError::MissingSampleColumn { requested: None })?;

    let source = table
        .column(name)
        .ok_or_else(|| TransformError::MissingSampleColumn {
            requested: Some(name.to_string()),
        })?;

    let values = source
        .values
        .iter()
        .enumerate()
        .map(|(row, value)| scale(value).ok_or_else(|| mismatch(name, row, value)))
        .collect::<TransformResult<Vec<_>>>()?;

    table.insert_column(0, Column::new(TIME_COLUMN, values))?;

    Ok(())
}

fn scale(value: &CellValue) -> Option<CellValue> {
    if value.is_empty() {
        return Some(CellValue::Empty);
    }
    value.as_f64().map(|v| CellValue::Float(v * TIME_SCALE))
}

fn mismatch(column: &str, row: usize, value: &CellValue) -> TransformError {
    TransformError::TypeMismatch {
        column: column.to_string(),
        row: row + 1,
        value: value.to_string(),
    }
}
