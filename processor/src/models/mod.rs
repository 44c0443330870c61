//! In-memory table model.
//!
//! - [`Table`] - Ordered, equal-length named columns
//! - [`Column`] - A named sequence of cells
//! - [`CellValue`] - A single dynamically typed cell

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

// =============================================================================
// Cell Value
// =============================================================================

/// A single cell.
///
/// `Int` and `Float` are numeric; `Empty` is a missing value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Numeric value of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", format_float(*v)),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip representation, keeping a decimal point on integral values.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

// =============================================================================
// Column
// =============================================================================

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unify numeric cells to a single dtype.
    ///
    /// All-integral numeric columns become `Int`, anything with a fractional
    /// value becomes `Float` throughout.
    pub fn unify_numeric(&mut self) {
        let has_fraction = self.values.iter().any(|v| match v {
            CellValue::Float(f) => f.fract() != 0.0 || !f.is_finite(),
            _ => false,
        });

        for value in &mut self.values {
            match value {
                CellValue::Int(i) if has_fraction => *value = CellValue::Float(*i as f64),
                CellValue::Float(f) if !has_fraction && f.abs() < i64::MAX as f64 => {
                    *value = CellValue::Int(*f as i64)
                }
                _ => {}
            }
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered sequence of equal-length named columns.
///
/// Column names are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self, ModelError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(ModelError::RaggedColumns {
                    column: bad.name.clone(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from a header row and data rows.
    ///
    /// Short rows are padded with `Empty`, extra cells are ignored.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.values.push(cells.next().unwrap_or_default());
            }
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// First column with exactly this name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Insert a column at `index`, shifting later columns right.
    pub fn insert_column(&mut self, index: usize, column: Column) -> Result<(), ModelError> {
        let actual = column.len();
        if !self.columns.is_empty() && actual != self.row_count() {
            return Err(ModelError::RaggedColumns {
                column: column.name,
                expected: self.row_count(),
                actual,
            });
        }
        self.columns.insert(index.min(self.columns.len()), column);
        Ok(())
    }

    /// Keep only the columns for which `keep(index, column)` is true.
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &Column) -> bool,
    {
        let mut index = 0;
        self.columns.retain(|c| {
            let kept = keep(index, c);
            index += 1;
            kept
        });
    }

    /// Iterate rows as vectors of cell references.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        (0..self.row_count()).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.values.iter().take(n).cloned().collect()))
            .collect();
        Table { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Int(*v)).collect()
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::new(vec![
            Column::new("a", ints(&[1, 2, 3])),
            Column::new("b", ints(&[1, 2])),
        ]);
        match result {
            Err(ModelError::RaggedColumns { column, expected, actual }) => {
                assert_eq!(column, "b");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected ragged error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Int(1)],
                vec![CellValue::Int(2), CellValue::Int(3), CellValue::Int(4)],
            ],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns()[1].values, vec![CellValue::Empty, CellValue::Int(3)]);
    }

    #[test]
    fn test_insert_column_at_front() {
        let mut table = Table::new(vec![Column::new("a", ints(&[1, 2]))]).unwrap();
        table.insert_column(0, Column::new("Time", ints(&[0, 0]))).unwrap();
        assert_eq!(table.column_names(), vec!["Time", "a"]);

        let err = table.insert_column(0, Column::new("bad", ints(&[1]))).unwrap_err();
        assert!(matches!(
            err,
            ModelError::RaggedColumns { ref column, expected: 2, actual: 1 } if column == "bad"
        ));
        assert_eq!(table.column_names(), vec!["Time", "a"]);
    }

    #[test]
    fn test_head_and_rows() {
        let table = Table::new(vec![
            Column::new("a", ints(&[1, 2, 3])),
            Column::new("b", ints(&[4, 5, 6])),
        ])
        .unwrap();

        let head = table.head(2);
        assert_eq!(head.row_count(), 2);
        assert_eq!(head.column_names(), table.column_names());

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec![&CellValue::Int(3), &CellValue::Int(6)]);
    }

    #[test]
    fn test_unify_numeric() {
        let mut integral = Column::new("a", vec![CellValue::Float(1.0), CellValue::Int(2), CellValue::Empty]);
        integral.unify_numeric();
        assert_eq!(integral.values, vec![CellValue::Int(1), CellValue::Int(2), CellValue::Empty]);

        let mut mixed = Column::new("b", vec![CellValue::Float(1.5), CellValue::Int(2)]);
        mixed.unify_numeric();
        assert_eq!(mixed.values, vec![CellValue::Float(1.5), CellValue::Float(2.0)]);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Float(0.0).to_string(), "0.0");
        assert_eq!(CellValue::Float(0.01).to_string(), "0.01");
        assert_eq!(CellValue::Int(7).to_string(), "7");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
    }
}
