//! Error types for the sampleproc pipeline.
//!
//! Each layer has its own error enum:
//!
//! - [`ModelError`] - Table construction errors
//! - [`LoadError`] - Reading CSV/XLSX files into a table
//! - [`TransformError`] - The header/sample/Time transform
//! - [`SaveError`] - Writing a table back out
//! - [`RecentFilesError`] - Recent-files store
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP API errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::transform::TIME_COLUMN;

// =============================================================================
// Model Errors
// =============================================================================

/// Errors raised while assembling a [`crate::models::Table`].
#[derive(Debug, Error)]
pub enum ModelError {
    /// A column's length disagrees with the rest of the table.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading a tabular file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input path does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The extension is neither `.xlsx` nor `.csv`.
    #[error("Unsupported file format: '{0}' (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid delimited text.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid or unreadable workbook.
    #[error("Invalid XLSX workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// File has no header row.
    #[error("File is empty")]
    EmptyFile,

    /// Workbook has no worksheet to read.
    #[error("Workbook does not contain any worksheets")]
    NoWorksheet,

    /// Loaded data does not form a rectangular table.
    #[error(transparent)]
    Model(#[from] ModelError),
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors from the tabular transform.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No column name contains `sample` after trimming.
    #[error("No column name contains 'sample' (columns: {})", .columns.join(", "))]
    NoSampleColumn { columns: Vec<String> },

    /// Time derivation ran without a resolved sample column.
    #[error("Cannot derive '{}' column: {}", TIME_COLUMN, describe_requested(.requested))]
    MissingSampleColumn { requested: Option<String> },

    /// The sample column holds a value that cannot be scaled.
    ///
    /// `row` is the 1-based data row number.
    #[error("Sample column '{column}' holds non-numeric value '{value}' at row {row}")]
    TypeMismatch {
        column: String,
        row: usize,
        value: String,
    },

    /// The derived column could not be added to the table.
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn describe_requested(requested: &Option<String>) -> String {
    match requested {
        Some(name) => format!("sample column '{}' is not in the table", name),
        None => "no sample column was designated".to_string(),
    }
}

// =============================================================================
// Save Errors
// =============================================================================

/// Errors while writing a table.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The output extension is neither `.xlsx` nor `.csv`.
    #[error("Unsupported output format: '{0}' (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    /// Failed to write file.
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook serialization failed.
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Table exceeds worksheet limits.
    #[error("Table of {rows} rows x {columns} columns exceeds worksheet limits")]
    TooLarge { rows: usize, columns: usize },
}

// =============================================================================
// Recent Files Errors
// =============================================================================

/// Errors from the recent-files store.
#[derive(Debug, Error)]
pub enum RecentFilesError {
    /// IO error.
    #[error("Recent files IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Recent files JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No entry at that position.
    #[error("No recent file at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Entry points at a file that no longer exists; it has been removed.
    #[error("Recent file no longer exists: {}", .0.display())]
    FileMissing(PathBuf),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::process_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Saving error.
    #[error("Save error: {0}")]
    Save(#[from] SaveError),

    /// Recent-files store error.
    #[error("Recent files error: {0}")]
    Recent(#[from] RecentFilesError),

    /// Caller supplied inconsistent options.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Background worker panicked or was cancelled.
    #[error("Worker failed: {0}")]
    Worker(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Result type for recent-files operations.
pub type RecentResult<T> = Result<T, RecentFilesError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::UnsupportedFormat(".txt".into());
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains(".txt"));

        // TransformError -> PipelineError
        let transform_err = TransformError::NoSampleColumn {
            columns: vec!["DOF1".into(), "DOF2".into()],
        };
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("DOF1, DOF2"));
    }

    #[test]
    fn test_type_mismatch_format() {
        let err = TransformError::TypeMismatch {
            column: "sample".into(),
            row: 2,
            value: "B".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'sample'"));
        assert!(msg.contains("'B'"));
        assert!(msg.contains("row 2"));
    }

    #[test]
    fn test_missing_sample_column_format() {
        let none = TransformError::MissingSampleColumn { requested: None };
        assert!(none.to_string().contains("no sample column was designated"));

        let named = TransformError::MissingSampleColumn {
            requested: Some("sample 9".into()),
        };
        assert!(named.to_string().contains("'sample 9'"));
    }
}
