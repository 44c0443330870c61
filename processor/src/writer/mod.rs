//! Tabular file writing.
//!
//! The output format follows the target path's extension (`.csv` or `.xlsx`).
//! Both writers can also serialize to memory for the HTTP API.

use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

use crate::error::{SaveError, SaveResult};
use crate::models::{CellValue, Table};
use crate::parser::FileFormat;

/// Suffix appended to the input stem by quick save.
pub const PROCESSED_SUFFIX: &str = "_processed";

/// Worksheet limits (data rows exclude the header row).
const XLSX_MAX_DATA_ROWS: usize = 1_048_575;
const XLSX_MAX_COLUMNS: usize = 16_384;

/// Write `table` to `path`, picking the format from the extension.
pub fn save<P: AsRef<Path>>(table: &Table, path: P) -> SaveResult<()> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path).map_err(SaveError::UnsupportedFormat)?;
    save_as(table, path, format)
}

/// Write `table` to `path` in an explicit format.
pub fn save_as(table: &Table, path: &Path, format: FileFormat) -> SaveResult<()> {
    let bytes = write_bytes(table, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize `table` in memory.
pub fn write_bytes(table: &Table, format: FileFormat) -> SaveResult<Vec<u8>> {
    match format {
        FileFormat::Csv => write_csv_bytes(table),
        FileFormat::Xlsx => write_xlsx_bytes(table),
    }
}

/// Comma-delimited UTF-8, header first, missing cells as empty fields.
pub fn write_csv_bytes(table: &Table) -> SaveResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SaveError::Io(e.into_error()))
}

/// Single worksheet with a header row.
pub fn write_xlsx_bytes(table: &Table) -> SaveResult<Vec<u8>> {
    if table.row_count() > XLSX_MAX_DATA_ROWS || table.column_count() > XLSX_MAX_COLUMNS {
        return Err(SaveError::TooLarge {
            rows: table.row_count(),
            columns: table.column_count(),
        });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // bounds checked above, the casts cannot truncate
    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet.write_string(0, col, column.name.as_str())?;

        for (row_idx, cell) in column.values.iter().enumerate() {
            let row = row_idx as u32 + 1;
            match cell {
                CellValue::Empty => {}
                CellValue::Int(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                CellValue::Float(f) if f.is_finite() => {
                    worksheet.write_number(row, col, *f)?;
                }
                CellValue::Float(_) => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(row, col, s.as_str())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Quick-save path: `<dir>/<stem>_processed.<ext>` next to the input.
pub fn processed_output_path(input: &Path, format: FileFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}.{}", stem, PROCESSED_SUFFIX, format.extension()))
}
