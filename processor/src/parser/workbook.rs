//! XLSX reader (first worksheet only).

use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

use super::unnamed_header;
use crate::error::{LoadError, LoadResult};
use crate::models::{CellValue, Table};

/// Parse workbook bytes; the first used row of the first sheet is the header.
///
/// The used range starts at the first non-empty cell, so blank leading
/// columns are padded back in as empty `Unnamed: i` columns. Blank leading
/// rows are skipped.
pub fn parse_xlsx_bytes(bytes: &[u8]) -> LoadResult<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::EmptyFile)?;

    let headers: Vec<String> = (0..offset)
        .map(unnamed_header)
        .chain(
            header_row
                .iter()
                .enumerate()
                .map(|(i, cell)| header_name(i + offset, cell)),
        )
        .collect();

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| {
            std::iter::repeat(CellValue::Empty)
                .take(offset)
                .chain(row.iter().map(cell_value))
                .collect()
        })
        .collect();

    let mut table = Table::from_rows(headers, data);
    for column in table.columns_mut() {
        column.unify_numeric();
    }
    Ok(table)
}

fn header_name(index: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => unnamed_header(index),
        Data::String(s) if s.trim().is_empty() => unnamed_header(index),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}
