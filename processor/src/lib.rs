//! # sampleproc - sample-indexed table processing
//!
//! Loads CSV/XLSX tables, trims headers, keeps the leftmost `sample` column,
//! derives a `Time` axis from it and writes the result back out.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / XLSX │────▶│   Parser    │────▶│  Transform  │────▶│ CSV / XLSX  │
//! │  (any enc)  │     │  (auto-enc) │     │ (trim/dedup │     │ _processed  │
//! │             │     │             │     │  /Time)     │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sampleproc::{load, save, transform};
//!
//! let table = load("run.xlsx")?;
//! let processed = transform(&table)?;
//! save(&processed, "run_processed.xlsx")?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Table, Column and CellValue
//! - [`parser`] - CSV/XLSX loading with auto-detection
//! - [`writer`] - CSV/XLSX saving
//! - [`transform`] - Header trim, sample dedup, Time derivation and the file pipeline
//! - [`recent`] - Recent-files store
//! - [`preview`] - Terminal rendering
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Input / output
pub mod parser;
pub mod writer;

// Transformation
pub mod transform;

// Session state
pub mod config;
pub mod recent;

// Presentation
pub mod api;
pub mod preview;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    LoadError, ModelError, PipelineError, RecentFilesError, SaveError, ServerError, TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, Column, Table};

// =============================================================================
// Re-exports - Loading and saving
// =============================================================================

pub use parser::{load, load_bytes, load_with_options, CsvInfo, FileFormat, LoadOptions, Loaded};
pub use writer::{processed_output_path, save, save_as, write_bytes};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    dedupe_sample_columns, derive_time_column, normalize_headers, transform, transform_with_report,
    TransformReport, TIME_COLUMN, TIME_SCALE,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    inspect_file, process_bytes, process_file, process_queue, process_table, process_to_bytes,
    BatchReport, FailedFile, FileOutcome, Inspection, ProcessOptions, Processed, ProcessedFile,
};

// =============================================================================
// Re-exports - Recent files
// =============================================================================

pub use recent::RecentFiles;

// Server
pub mod server {
    pub use crate::api::server::{start_server, start_server_with, ServerOptions};
}
