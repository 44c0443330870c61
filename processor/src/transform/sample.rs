//! Sample-column deduplication.

use crate::error::{TransformError, TransformResult};
use crate::models::Table;

/// Token that marks a sample-index column.
pub const SAMPLE_TOKEN: &str = "sample";

/// Whether a column name designates a sample-index column.
///
/// Case-insensitive substring match on the trimmed name.
pub fn is_sample_column(name: &str) -> bool {
    name.trim().to_lowercase().contains(SAMPLE_TOKEN)
}

/// Positions of all sample-index columns, left to right.
pub fn find_sample_columns(table: &Table) -> Vec<usize> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| is_sample_column(&c.name))
        .map(|(i, _)| i)
        .collect()
}

/// Outcome of [`dedupe_sample_columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSelection {
    /// Name of the retained (leftmost) sample column.
    pub retained: String,
    /// Names of the dropped sample columns, in original order.
    pub dropped: Vec<String>,
}

/// Keep the leftmost sample column and drop every other one.
///
/// Columns are dropped by position, so a later column sharing the retained
/// column's name is dropped as well. The table is not modified on error.
pub fn dedupe_sample_columns(table: &mut Table) -> TransformResult<SampleSelection> {
    let matches = find_sample_columns(table);

    let Some((&first, rest)) = matches.split_first() else {
        return Err(TransformError::NoSampleColumn {
            columns: table.column_names(),
        });
    };

    let retained = table.columns()[first].name.clone();
    let dropped: Vec<String> = rest
        .iter()
        .map(|&i| table.columns()[i].name.clone())
        .collect();

    if !rest.is_empty() {
        table.retain_columns(|i, _| !rest.contains(&i));
    }

    Ok(SampleSelection { retained, dropped })
}
