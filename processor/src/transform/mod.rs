//! Transformation module.
//!
//! The tabular transform runs three ordered steps on a copy of the input:
//!
//! 1. [`normalize_headers`] - trim column names
//! 2. [`dedupe_sample_columns`] - keep the leftmost `sample` column
//! 3. [`derive_time_column`] - insert `Time = sample * 0.01` first
//!
//! The file-level flow (load, transform, save, batch queue) lives in
//! [`pipeline`].

pub mod headers;
pub mod pipeline;
pub mod sample;
pub mod time;

pub use headers::normalize_headers;
pub use pipeline::*;
pub use sample::{dedupe_sample_columns, find_sample_columns, is_sample_column, SampleSelection, SAMPLE_TOKEN};
pub use time::{derive_time_column, TIME_COLUMN, TIME_SCALE};

use serde::Serialize;

use crate::error::TransformResult;
use crate::models::Table;

/// What the transform changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    /// Header names that were trimmed, as `(before, after)`.
    pub renamed: Vec<(String, String)>,
    /// Retained sample-index column.
    pub sample_column: String,
    /// Sample columns removed in favour of `sample_column`.
    pub dropped_columns: Vec<String>,
}

/// Run the full transform and return the new table.
///
/// The input is never modified; any error leaves the caller's table as it was.
///
/// Running the transform on its own output succeeds again and inserts a
/// second `Time` column in front of the first one.
pub fn transform(table: &Table) -> TransformResult<Table> {
    transform_with_report(table).map(|(out, _)| out)
}

/// Same as [`transform`], also reporting what was renamed and dropped.
pub fn transform_with_report(table: &Table) -> TransformResult<(Table, TransformReport)> {
    let mut out = table.clone();

    let renamed = normalize_headers(&mut out);
    let selection = dedupe_sample_columns(&mut out)?;
    derive_time_column(&mut out, Some(&selection.retained))?;

    Ok((
        out,
        TransformReport {
            renamed,
            sample_column: selection.retained,
            dropped_columns: selection.dropped,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::models::{CellValue, Column};
    use proptest::prelude::*;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Int(*v)).collect()
    }

    fn floats(values: &[f64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Float(*v)).collect()
    }

    fn time_values(table: &Table) -> Vec<f64> {
        table.columns()[0]
            .values
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect()
    }

    #[test]
    fn test_mixed_sample_columns() {
        let input = Table::new(vec![
            Column::new(" sample 수 ", ints(&[0, 1, 2])),
            Column::new("DOF1", floats(&[1.1, 1.2, 1.3])),
            Column::new(" sample 1 ", ints(&[0, 1, 2])),
            Column::new("DOF2", floats(&[2.1, 2.2, 2.3])),
            Column::new(" sample 2 ", ints(&[0, 1, 2])),
        ])
        .unwrap();

        let (out, report) = transform_with_report(&input).unwrap();

        assert_eq!(out.column_names(), vec!["Time", "sample 수", "DOF1", "DOF2"]);
        let time = time_values(&out);
        for (got, want) in time.iter().zip([0.00, 0.01, 0.02]) {
            assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
        }
        assert_eq!(report.sample_column, "sample 수");
        assert_eq!(report.dropped_columns, vec!["sample 1", "sample 2"]);
        assert_eq!(report.renamed.len(), 3);

        // DOF values carried through untouched
        assert_eq!(out.columns()[2].values, floats(&[1.1, 1.2, 1.3]));
    }

    #[test]
    fn test_no_sample_column() {
        let input = Table::new(vec![
            Column::new(" DOF1 ", floats(&[1.0])),
            Column::new("DOF2", floats(&[2.0])),
        ])
        .unwrap();
        let before = input.clone();

        let err = transform(&input).unwrap_err();
        assert!(matches!(err, TransformError::NoSampleColumn { .. }));
        assert_eq!(input, before);
    }

    #[test]
    fn test_text_sample_column() {
        let input = Table::new(vec![Column::new(
            "Sample",
            vec![CellValue::Text("A".into()), CellValue::Text("B".into())],
        )])
        .unwrap();

        let err = transform(&input).unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { ref value, row: 1, .. } if value == "A"));
    }

    #[test]
    fn test_double_invocation_adds_second_time_column() {
        let input = Table::new(vec![
            Column::new("sample", ints(&[0, 10])),
            Column::new("DOF1", floats(&[0.5, 0.6])),
        ])
        .unwrap();

        let once = transform(&input).unwrap();
        let twice = transform(&once).unwrap();

        assert_eq!(twice.column_names(), vec!["Time", "Time", "sample", "DOF1"]);
        assert_eq!(twice.columns()[0].values, twice.columns()[1].values);
        assert_eq!(twice.columns()[2].values, ints(&[0, 10]));
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn column_name() -> impl Strategy<Value = String> {
        prop_oneof![
            "[ ]{0,2}[A-Za-z]{1,6}[ ]{0,2}",
            "[ ]{0,2}(sample|Sample|SAMPLE)[ _a-z0-9]{0,4}",
        ]
    }

    fn numeric_table() -> impl Strategy<Value = Table> {
        (1usize..5).prop_flat_map(|rows| {
            prop::collection::vec(
                (column_name(), prop::collection::vec(-1000i64..1000, rows)),
                1..7,
            )
            .prop_map(|cols| {
                Table::new(
                    cols.into_iter()
                        .map(|(name, values)| Column::new(name, ints(&values)))
                        .collect(),
                )
                .unwrap()
            })
        })
    }

    proptest! {
        #[test]
        fn prop_time_first_when_sample_present(table in numeric_table()) {
            let has_sample = table.columns().iter().any(|c| is_sample_column(&c.name));
            let before = table.clone();

            match transform(&table) {
                Ok(out) => {
                    prop_assert!(has_sample);
                    prop_assert_eq!(out.columns()[0].name.as_str(), TIME_COLUMN);
                    let remaining = out.columns().iter().filter(|c| is_sample_column(&c.name)).count();
                    prop_assert_eq!(remaining, 1);
                    prop_assert_eq!(out.row_count(), table.row_count());
                }
                Err(TransformError::NoSampleColumn { .. }) => {
                    prop_assert!(!has_sample);
                    prop_assert_eq!(&table, &before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        #[test]
        fn prop_leftmost_sample_retained(table in numeric_table()) {
            let matches = find_sample_columns(&table);
            prop_assume!(!matches.is_empty());

            let first = &table.columns()[matches[0]];
            let (out, report) = transform_with_report(&table).unwrap();

            prop_assert_eq!(&report.sample_column, first.name.trim());
            let retained = out.columns()[1..].iter().find(|c| is_sample_column(&c.name)).unwrap();
            prop_assert_eq!(&retained.values, &first.values);

            // non-sample columns keep their relative order
            let others: Vec<String> = table.columns().iter()
                .filter(|c| !is_sample_column(&c.name))
                .map(|c| c.name.trim().to_string())
                .collect();
            let out_others: Vec<String> = out.columns()[1..].iter()
                .filter(|c| !is_sample_column(&c.name))
                .map(|c| c.name.clone())
                .collect();
            prop_assert_eq!(others, out_others);
        }
    }
}
