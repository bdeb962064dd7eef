//! Upload Handlers
//!
//! HTTP handlers for the CSV upload and bulk-delete trigger endpoints.
//! Grounded on `original_source/.../app/api/upload.py`: stream the file
//! to the configured temp directory, enforce the size ceiling both from
//! the declared content-length and the bytes actually written, run the
//! pre-flight `CsvValidator`, then hand off to the job use cases. Error
//! mapping follows `streaming_handlers.rs`'s `map_error` convention.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tokio::io::AsyncWriteExt;

use crate::application::use_cases::create_bulk_delete_job::CreateBulkDeleteJobUseCase;
use crate::application::use_cases::create_ingest_job::CreateIngestJobUseCase;
use crate::infrastructure::validation::csv_validator::CsvValidator;
use crate::presentation::http::dto::ingest_dto::JobAcceptedResponse;
use crate::shared::error::{ApplicationError, ValidationError};
use crate::shared::Config;

/// Accepts a multipart CSV upload, validates it, and enqueues an import job.
pub async fn upload_csv(
    State(config): State<Arc<Config>>,
    State(use_case): State<Arc<CreateIngestJobUseCase>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {e}")))?
        .ok_or_else(|| bad_request("no file field in upload".to_string()))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| bad_request("filename is required".to_string()))?;

    if !filename.to_lowercase().ends_with(".csv") {
        return Err(bad_request(format!(
            "invalid file type. expected .csv, got {filename}"
        )));
    }

    tokio::fs::create_dir_all(&config.upload_tmp_dir)
        .await
        .map_err(|e| internal_error(format!("cannot create upload directory: {e}")))?;

    let job_id = uuid::Uuid::new_v4();
    let temp_file_path = config.upload_tmp_dir.join(format!("{job_id}.csv"));
    let max_bytes = config.max_upload_size_bytes();

    if let Err(err) = save_field_to_disk(field, &temp_file_path, max_bytes).await {
        let _ = tokio::fs::remove_file(&temp_file_path).await;
        return Err(err);
    }

    let validator = CsvValidator::new();
    let report = match validator.validate(&temp_file_path) {
        Ok(report) => report,
        Err(err) => {
            let _ = tokio::fs::remove_file(&temp_file_path).await;
            return Err(validation_error_response(err));
        }
    };

    if !report.ok {
        let _ = tokio::fs::remove_file(&temp_file_path).await;
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "message": "CSV validation failed",
                "errors": report.errors,
            })),
        ));
    }

    let job = use_case
        .execute(filename, &temp_file_path, Some(report.total_rows))
        .await
        .map_err(application_error_response)?;

    let response = JobAcceptedResponse::for_job(
        &job,
        &config.api_prefix,
        format!(
            "CSV upload accepted. Processing {} rows in background.",
            report.total_rows
        ),
    );
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Queues a bulk-delete job covering every product row, per spec.md §6.
pub async fn bulk_delete_products(
    State(config): State<Arc<Config>>,
    State(use_case): State<Arc<CreateBulkDeleteJobUseCase>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let job = use_case.execute().await.map_err(application_error_response)?;

    let response = JobAcceptedResponse::for_job(
        &job,
        &config.api_prefix,
        "Bulk delete accepted. Removing products in background.",
    );
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Streams a multipart field to disk, aborting once `max_bytes` is exceeded
/// regardless of what (if anything) the client declared up front.
async fn save_field_to_disk(
    mut field: axum::extract::multipart::Field<'_>,
    path: &std::path::Path,
    max_bytes: u64,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| internal_error(format!("cannot create temp file: {e}")))?;

    let mut written: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| bad_request(format!("error reading upload stream: {e}")))?
    {
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(too_large(written, max_bytes));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| internal_error(format!("error writing temp file: {e}")))?;
    }

    file.flush()
        .await
        .map_err(|e| internal_error(format!("error flushing temp file: {e}")))?;
    Ok(())
}

fn bad_request(message: String) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "message": message })))
}

fn internal_error(message: String) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!("upload error: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "message": "failed to process upload" })),
    )
}

fn too_large(actual_bytes: u64, max_bytes: u64) -> (StatusCode, Json<serde_json::Value>) {
    let actual_mb = actual_bytes as f64 / (1024.0 * 1024.0);
    let max_mb = max_bytes / (1024 * 1024);
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(serde_json::json!({
            "message": format!(
                "File size ({actual_mb:.2} MB) exceeds maximum allowed size ({max_mb} MB)"
            )
        })),
    )
}

fn validation_error_response(err: ValidationError) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        ValidationError::InvalidExtension(name) => bad_request(format!("invalid file extension: {name}")),
        ValidationError::FileTooLarge(actual_mb, max_mb) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({
                "message": format!(
                    "File size ({actual_mb:.2} MB) exceeds maximum allowed size ({max_mb} MB)"
                )
            })),
        ),
        other => bad_request(other.to_string()),
    }
}

fn application_error_response(err: ApplicationError) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        ApplicationError::Validation(v) => validation_error_response(v),
        other => {
            tracing::error!("upload job creation failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "message": "failed to process upload" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_reports_mb_not_bytes() {
        let (status, body) = too_large(600 * 1024 * 1024, 512 * 1024 * 1024);
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let message = body.0["message"].as_str().unwrap();
        assert!(message.contains("600.00 MB"));
        assert!(message.contains("512 MB"));
    }

    #[test]
    fn validation_error_maps_invalid_extension_to_400() {
        let (status, _) = validation_error_response(ValidationError::InvalidExtension("foo.txt".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_error_maps_file_too_large_to_413() {
        let (status, _) = validation_error_response(ValidationError::FileTooLarge(120.0, 100));
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
