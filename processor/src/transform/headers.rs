//! Header normalization.

use crate::models::Table;

/// Trim leading and trailing whitespace from every column name.
///
/// Returns the `(before, after)` pairs of names that actually changed.
/// Names that collide after trimming are left as duplicates.
pub fn normalize_headers(table: &mut Table) -> Vec<(String, String)> {
    let mut renamed = Vec::new();
    for column in table.columns_mut() {
        let trimmed = column.name.trim();
        if trimmed.len() != column.name.len() {
            let trimmed = trimmed.to_string();
            renamed.push((std::mem::replace(&mut column.name, trimmed.clone()), trimmed));
        }
    }
    renamed
}
