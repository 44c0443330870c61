//! Tabular file loading.
//!
//! Picks a reader from the file extension (`.csv` or `.xlsx`) and returns a
//! [`Table`]. CSV input goes through encoding and delimiter auto-detection;
//! XLSX input reads the first worksheet with the first row as header.

pub mod delimited;
pub mod workbook;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::Table;

pub use delimited::{decode_content, detect_delimiter, detect_encoding, parse_csv_bytes, CsvInfo};
pub use workbook::parse_xlsx_bytes;

// =============================================================================
// File Format
// =============================================================================

/// Supported tabular formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Format implied by a path's extension (case-insensitive).
    ///
    /// The error carries the offending extension, or the whole path when there is none.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("xlsx") => Ok(FileFormat::Xlsx),
            Some(other) => Err(format!(".{}", other)),
            None => Err(path.display().to_string()),
        }
    }

    /// Parse a user-supplied format name (`csv`, `.xlsx`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv; charset=utf-8",
            FileFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Options for loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOptions {
    /// CSV delimiter (auto-detect if not specified). Ignored for XLSX.
    pub delimiter: Option<u8>,
}

/// A loaded table with metadata about how it was read.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Table,
    pub format: FileFormat,
    /// Present for CSV input.
    pub csv_info: Option<CsvInfo>,
}

/// Load a file with default options.
pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Table> {
    load_with_options(path, &LoadOptions::default()).map(|loaded| loaded.table)
}

/// Load a file, returning format metadata alongside the table.
///
/// The path must exist and have a `.csv` or `.xlsx` extension.
pub fn load_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> LoadResult<Loaded> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let format = FileFormat::from_path(path).map_err(LoadError::UnsupportedFormat)?;
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, format, options)
}

/// Load from in-memory bytes of a known format.
pub fn load_bytes(bytes: &[u8], format: FileFormat, options: &LoadOptions) -> LoadResult<Loaded> {
    match format {
        FileFormat::Csv => {
            let (table, info) = parse_csv_bytes(bytes, options.delimiter)?;
            Ok(Loaded {
                table,
                format,
                csv_info: Some(info),
            })
        }
        FileFormat::Xlsx => Ok(Loaded {
            table: parse_xlsx_bytes(bytes)?,
            format,
            csv_info: None,
        }),
    }
}

/// Header name for an empty header cell.
pub(crate) fn unnamed_header(index: usize) -> String {
    format!("Unnamed: {}", index)
}
