//! REST API types.
//!
//! Preview responses carry the transformed columns and the first rows as
//! plain JSON values; errors share one envelope with a machine-readable kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{LoadError, PipelineError, SaveError, ServerError, TransformError};
use crate::models::CellValue;
use crate::parser::{delimited::format_delimiter, FileFormat};
use crate::transform::Processed;

/// Response sent after a preview upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Always "ready" on success
    pub status: String,

    /// Uploaded file name, if the client sent one
    pub file_name: Option<String>,

    /// Detected input format
    pub format: FileFormat,

    /// Retained sample column
    pub sample_column: String,

    /// Sample columns that were dropped
    pub dropped_columns: Vec<String>,

    /// Headers that were trimmed, as `[before, after]`
    pub renamed_columns: Vec<(String, String)>,

    /// Rows in the processed table
    pub row_count: usize,

    /// Processed column names, `Time` first
    pub columns: Vec<String>,

    /// First rows of the processed table
    pub rows: Vec<Vec<CellValue>>,

    /// CSV info (absent for XLSX input)
    pub csv_info: Option<CsvMetadata>,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
}

impl PreviewResponse {
    pub fn new(processed: &Processed, file_name: Option<String>, preview_rows: usize) -> Self {
        let table = &processed.table;

        PreviewResponse {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            file_name,
            format: processed.format,
            sample_column: processed.report.sample_column.clone(),
            dropped_columns: processed.report.dropped_columns.clone(),
            renamed_columns: processed.report.renamed.clone(),
            row_count: table.row_count(),
            columns: table.column_names(),
            rows: table
                .rows()
                .take(preview_rows)
                .map(|row| row.into_iter().cloned().collect())
                .collect(),
            csv_info: processed.csv_info.as_ref().map(|info| CsvMetadata {
                encoding: info.encoding.clone(),
                delimiter: format_delimiter(info.delimiter),
            }),
        }
    }
}

/// Create an error response
pub fn error_response(kind: &str, error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "kind": kind,
        "error": error,
    })
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Pipeline(e) => match e {
                PipelineError::Load(LoadError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                PipelineError::Load(LoadError::FileNotFound(_)) => StatusCode::NOT_FOUND,
                PipelineError::Load(LoadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
                PipelineError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Transform(TransformError::Model(_)) => StatusCode::INTERNAL_SERVER_ERROR,
                PipelineError::Transform(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Save(SaveError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                PipelineError::Save(SaveError::TooLarge { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                PipelineError::Save(_) | PipelineError::Recent(_) | PipelineError::Worker(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Short error kind for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BadRequest",
            ServerError::Internal(_) => "Internal",
            ServerError::Pipeline(e) => match e {
                PipelineError::Load(LoadError::FileNotFound(_)) => "FileNotFound",
                PipelineError::Load(LoadError::UnsupportedFormat(_))
                | PipelineError::Save(SaveError::UnsupportedFormat(_)) => "UnsupportedFormat",
                PipelineError::Load(_) => "LoadFailed",
                PipelineError::Transform(TransformError::NoSampleColumn { .. }) => "NoSampleColumn",
                PipelineError::Transform(TransformError::MissingSampleColumn { .. }) => "MissingSampleColumn",
                PipelineError::Transform(TransformError::TypeMismatch { .. }) => "TypeMismatch",
                PipelineError::Transform(TransformError::Model(_)) => "Internal",
                PipelineError::Save(_) => "SaveFailed",
                PipelineError::Recent(_) => "RecentFiles",
                PipelineError::InvalidRequest(_) => "BadRequest",
                PipelineError::Worker(_) => "Internal",
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(error_response(self.kind(), &self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LoadOptions;
    use crate::transform::process_bytes;

    #[test]
    fn test_preview_response_shape() {
        let csv = " sample 수 ,DOF1,sample 1\n0,1.5,0\n1,2.5,1\n2,3.5,2\n";
        let processed = process_bytes(csv.as_bytes(), FileFormat::Csv, &LoadOptions::default()).unwrap();

        let response = PreviewResponse::new(&processed, Some("run.csv".into()), 2);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "ready");
        assert_eq!(json["format"], "csv");
        assert_eq!(json["sampleColumn"], "sample 수");
        assert_eq!(json["droppedColumns"], json!(["sample 1"]));
        assert_eq!(json["rowCount"], 3);
        assert_eq!(json["columns"], json!(["Time", "sample 수", "DOF1"]));
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["rows"][1], json!([0.01, 1, 2.5]));
        assert_eq!(json["csvInfo"]["delimiter"], ",");
    }

    #[test]
    fn test_status_mapping() {
        let no_sample: ServerError = PipelineError::from(TransformError::NoSampleColumn {
            columns: vec!["a".into()],
        })
        .into();
        assert_eq!(no_sample.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(no_sample.kind(), "NoSampleColumn");

        let unsupported: ServerError = PipelineError::from(LoadError::UnsupportedFormat(".txt".into())).into();
        assert_eq!(unsupported.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(unsupported.kind(), "UnsupportedFormat");

        let bad = ServerError::BadRequest("no file".into());
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response_envelope() {
        let body = error_response("TypeMismatch", "boom");
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "TypeMismatch");
        assert_eq!(body["error"], "boom");
        assert!(body["jobId"].as_str().is_some());
    }
}
