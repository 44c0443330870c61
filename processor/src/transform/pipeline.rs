//! High-level pipeline API: load, transform, save.
//!
//! This module combines the loader, the tabular transform and the writer
//! into file-level operations, plus a sequential queue that runs each file
//! on a blocking worker and keeps going when one of them fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use sampleproc::{process_queue, ProcessOptions};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = process_queue(
//!         vec![PathBuf::from("run1.xlsx"), PathBuf::from("run2.csv")],
//!         ProcessOptions::default(),
//!     ).await?;
//!
//!     println!("{} saved, {} failed", report.succeeded().count(), report.failed().count());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::sample::find_sample_columns;
use super::{transform_with_report, TransformReport};
use crate::api::logs::{log_error, log_info_indent, log_progress, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult, SaveError};
use crate::models::Table;
use crate::parser::{delimited::format_delimiter, load_bytes, load_with_options, CsvInfo, FileFormat, LoadOptions, Loaded};
use crate::writer::{processed_output_path, save_as, write_bytes};

/// Options for processing files
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// How to read the input
    pub load: LoadOptions,
    /// Output format for quick save
    pub output_format: FileFormat,
    /// Explicit output path (single input only)
    pub output_path: Option<PathBuf>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            output_format: FileFormat::Xlsx,
            output_path: None,
        }
    }
}

/// A file that was processed and saved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub report: TransformReport,
    /// RFC 3339 timestamp of the save
    pub processed_at: String,
}

/// A file that failed; the message is the rendered error
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: String,
}

/// Result for one queued file
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FileOutcome {
    Saved(ProcessedFile),
    Failed(FailedFile),
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Saved(done) => &done.input,
            FileOutcome::Failed(failed) => &failed.input,
        }
    }
}

/// Outcome of a queue run, in queue order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Saved files, in queue order
    pub fn succeeded(&self) -> impl Iterator<Item = &ProcessedFile> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Saved(done) => Some(done),
            FileOutcome::Failed(_) => None,
        })
    }

    /// Failed files, in queue order
    pub fn failed(&self) -> impl Iterator<Item = &FailedFile> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed(failed) => Some(failed),
            FileOutcome::Saved(_) => None,
        })
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Transformed table plus what the transform did, without saving
#[derive(Debug, Clone)]
pub struct Processed {
    pub table: Table,
    pub report: TransformReport,
    pub format: FileFormat,
    pub csv_info: Option<CsvInfo>,
}

/// What a file looks like before transforming
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub format: FileFormat,
    pub csv_info: Option<CsvInfo>,
    pub columns: Vec<String>,
    pub sample_columns: Vec<String>,
    pub row_count: usize,
}

/// Load and transform a file without saving.
pub fn process_table(input: &Path, load: &LoadOptions) -> PipelineResult<Processed> {
    let loaded = load_with_options(input, load)?;
    transform_loaded(loaded)
}

/// Load and transform in-memory bytes without saving.
pub fn process_bytes(bytes: &[u8], format: FileFormat, load: &LoadOptions) -> PipelineResult<Processed> {
    let loaded = load_bytes(bytes, format, load)?;
    transform_loaded(loaded)
}

/// Load, transform and save one file.
pub fn process_file(input: &Path, options: &ProcessOptions) -> PipelineResult<ProcessedFile> {
    let processed = process_table(input, &options.load)?;

    let (output, format) = match &options.output_path {
        Some(path) => {
            let format = FileFormat::from_path(path).map_err(SaveError::UnsupportedFormat)?;
            (path.clone(), format)
        }
        None => (
            processed_output_path(input, options.output_format),
            options.output_format,
        ),
    };

    save_as(&processed.table, &output, format)?;

    Ok(ProcessedFile {
        input: input.to_path_buf(),
        output,
        row_count: processed.table.row_count(),
        columns: processed.table.column_names(),
        report: processed.report,
        processed_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Transform and serialize in memory (used by the HTTP API).
pub fn process_to_bytes(
    bytes: &[u8],
    input_format: FileFormat,
    output_format: FileFormat,
    load: &LoadOptions,
) -> PipelineResult<(Vec<u8>, Processed)> {
    let processed = process_bytes(bytes, input_format, load)?;
    let out = write_bytes(&processed.table, output_format)?;
    Ok((out, processed))
}

/// Describe a file without transforming it.
pub fn inspect_file(input: &Path, load: &LoadOptions) -> PipelineResult<Inspection> {
    let loaded = load_with_options(input, load)?;
    let sample_columns = find_sample_columns(&loaded.table)
        .into_iter()
        .map(|i| loaded.table.columns()[i].name.clone())
        .collect();

    Ok(Inspection {
        format: loaded.format,
        columns: loaded.table.column_names(),
        row_count: loaded.table.row_count(),
        sample_columns,
        csv_info: loaded.csv_info,
    })
}

/// Process a queue of files one after another.
///
/// Each file runs on a blocking worker; a failure is recorded and the queue
/// moves on. Fails up front only if `output_path` is set for more than one input.
pub async fn process_queue(inputs: Vec<PathBuf>, options: ProcessOptions) -> PipelineResult<BatchReport> {
    if options.output_path.is_some() && inputs.len() > 1 {
        return Err(PipelineError::InvalidRequest(format!(
            "an explicit output path needs exactly one input, got {}",
            inputs.len()
        )));
    }

    let total = inputs.len();
    let mut report = BatchReport::default();

    if total == 0 {
        log_warning("Queue is empty");
        return Ok(report);
    }

    for (index, input) in inputs.into_iter().enumerate() {
        let name = display_name(&input);
        log_progress(
            percent(index, total),
            format!("Processing {} ({}/{})", name, index + 1, total),
        );

        let opts = options.clone();
        let worker_input = input.clone();
        let outcome = tokio::task::spawn_blocking(move || process_file(&worker_input, &opts))
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))
            .and_then(|r| r);

        match outcome {
            Ok(done) => {
                log_report(&done.report);
                log_progress(
                    percent(index + 1, total),
                    format!("{} saved to {}", name, done.output.display()),
                );
                report.outcomes.push(FileOutcome::Saved(done));
            }
            Err(e) => {
                log_error(format!("{}: {}", name, e));
                report.outcomes.push(FileOutcome::Failed(FailedFile {
                    input,
                    error: e.to_string(),
                }));
            }
        }
    }

    if report.is_success() {
        log_success(format!("All {} file(s) processed", total));
    } else {
        log_warning(format!(
            "{} of {} file(s) failed",
            report.failure_count(),
            total
        ));
    }

    Ok(report)
}

fn transform_loaded(loaded: Loaded) -> PipelineResult<Processed> {
    if let Some(info) = &loaded.csv_info {
        log_info_indent(
            format!(
                "Encoding: {}, separator: '{}'",
                info.encoding,
                format_delimiter(info.delimiter)
            ),
            1,
        );
    }
    log_info_indent(
        format!(
            "Read {} rows x {} columns",
            loaded.table.row_count(),
            loaded.table.column_count()
        ),
        1,
    );

    let (table, report) = transform_with_report(&loaded.table)?;

    Ok(Processed {
        table,
        report,
        format: loaded.format,
        csv_info: loaded.csv_info,
    })
}

fn log_report(report: &TransformReport) {
    if !report.renamed.is_empty() {
        log_info_indent(format!("Trimmed {} header(s)", report.renamed.len()), 1);
    }
    log_info_indent(format!("Sample column: {}", report.sample_column), 1);
    if !report.dropped_columns.is_empty() {
        log_info_indent(format!("Dropped: {}", report.dropped_columns.join(", ")), 1);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn percent(done: usize, total: usize) -> u8 {
    ((done * 100) / total.max(1)).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, TransformError};
    use crate::models::CellValue;
    use crate::parser::load;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE_CSV: &str = " sample 수 ,DOF1, sample 1 ,DOF2, sample 2 \n0,1.1,0,2.1,0\n1,1.2,1,2.2,1\n2,1.3,2,2.3,2\n";

    #[test]
    fn test_default_options() {
        let opts = ProcessOptions::default();
        assert_eq!(opts.output_format, FileFormat::Xlsx);
        assert!(opts.output_path.is_none());
        assert!(opts.load.delimiter.is_none());
    }

    #[test]
    fn test_process_file_quick_save() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.csv");
        fs::write(&input, SAMPLE_CSV).unwrap();

        let done = process_file(&input, &ProcessOptions::default()).unwrap();

        assert_eq!(done.output, dir.path().join("run_processed.xlsx"));
        assert_eq!(done.columns, vec!["Time", "sample 수", "DOF1", "DOF2"]);
        assert_eq!(done.row_count, 3);

        let saved = load(&done.output).unwrap();
        assert_eq!(saved.column_names(), done.columns);
        let time: Vec<f64> = saved.columns()[0].values.iter().filter_map(CellValue::as_f64).collect();
        assert_eq!(time.len(), 3);
        assert!((time[2] - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_process_file_explicit_csv_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.csv");
        let output = dir.path().join("out").join("result.csv");
        fs::write(&input, SAMPLE_CSV).unwrap();

        let opts = ProcessOptions {
            output_path: Some(output.clone()),
            ..ProcessOptions::default()
        };
        process_file(&input, &opts).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("Time,sample 수,DOF1,DOF2\n0.0,0,1.1,2.1\n0.01,1,1.2,2.2\n"));
    }

    #[test]
    fn test_explicit_output_needs_known_extension() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.csv");
        let output = dir.path().join("result.txt");
        fs::write(&input, SAMPLE_CSV).unwrap();

        let opts = ProcessOptions {
            output_path: Some(output.clone()),
            ..ProcessOptions::default()
        };
        let err = process_file(&input, &opts).unwrap_err();

        assert!(matches!(err, PipelineError::Save(SaveError::UnsupportedFormat(ref ext)) if ext == ".txt"));
        assert!(!output.exists());
    }

    #[test]
    fn test_inspect_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("run.csv");
        fs::write(&input, SAMPLE_CSV).unwrap();

        let inspection = inspect_file(&input, &LoadOptions::default()).unwrap();
        assert_eq!(inspection.format, FileFormat::Csv);
        assert_eq!(inspection.row_count, 3);
        assert_eq!(
            inspection.sample_columns,
            vec![" sample 수 ", " sample 1 ", " sample 2 "]
        );
    }

    #[test]
    fn test_process_to_bytes() {
        let (bytes, processed) =
            process_to_bytes(SAMPLE_CSV.as_bytes(), FileFormat::Csv, FileFormat::Csv, &LoadOptions::default())
                .unwrap();

        assert_eq!(processed.report.sample_column, "sample 수");
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Time,sample 수,DOF1,DOF2\n"));
    }

    #[tokio::test]
    async fn test_queue_continues_after_failure() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let no_sample = dir.path().join("no_sample.csv");
        let text_sample = dir.path().join("text_sample.csv");
        let unsupported = dir.path().join("notes.txt");
        let also_good = dir.path().join("also_good.csv");

        fs::write(&good, SAMPLE_CSV).unwrap();
        fs::write(&no_sample, "DOF1,DOF2\n1,2\n").unwrap();
        fs::write(&text_sample, "Sample\nA\nB\n").unwrap();
        fs::write(&unsupported, "sample\n1\n").unwrap();
        fs::write(&also_good, "sample_count,x\n5,1\n").unwrap();

        let opts = ProcessOptions {
            output_format: FileFormat::Csv,
            ..ProcessOptions::default()
        };
        let report = process_queue(
            vec![good, no_sample.clone(), text_sample, unsupported, also_good.clone()],
            opts,
        )
        .await
        .unwrap();

        assert_eq!(report.total(), 5);
        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.failure_count(), 3);
        assert!(!report.is_success());
        let order: Vec<&Path> = report.outcomes.iter().map(FileOutcome::input).collect();
        assert_eq!(order[1], no_sample.as_path());
        assert_eq!(order[4], also_good.as_path());
        assert!(matches!(report.outcomes[4], FileOutcome::Saved(_)));

        let failed: Vec<&FailedFile> = report.failed().collect();
        assert!(dir.path().join("also_good_processed.csv").exists());
        assert!(failed[0].error.contains("'sample'"));
        assert!(failed[1].error.contains("non-numeric"));
        assert!(failed[2].error.contains(".txt"));
    }

    #[tokio::test]
    async fn test_queue_rejects_output_path_with_many_inputs() {
        let opts = ProcessOptions {
            output_path: Some(PathBuf::from("out.csv")),
            ..ProcessOptions::default()
        };
        let err = process_queue(vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")], opts)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest(_)));
    }

    #[test]
    fn test_errors_keep_their_kind() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.csv");
        fs::write(&input, "a,b\n1,2\n").unwrap();

        let err = process_table(&input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(TransformError::NoSampleColumn { .. })));

        let err = process_table(&dir.path().join("gone.xlsx"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::FileNotFound(_))));
    }
}
