//! Ingest / bulk-delete job DTOs
//!
//! Shapes for the upload and bulk-delete boundary endpoints (spec §6).

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::Job;

/// 202 response for both `POST /upload` and `POST /products/bulk-delete`.
#[derive(Debug, Serialize)]
pub struct JobAcceptedResponse {
    pub job_id: Uuid,
    pub sse_url: String,
    pub message: String,
}

impl JobAcceptedResponse {
    pub fn for_job(job: &Job, api_prefix: &str, message: impl Into<String>) -> Self {
        Self {
            job_id: job.id,
            sse_url: format!("{api_prefix}/progress/{}", job.id),
            message: message.into(),
        }
    }
}

/// Row for the recent-jobs listing, used by `GET {api_prefix}/jobs`.
#[derive(Debug, Serialize)]
pub struct JobSummaryResponse {
    pub id: Uuid,
    pub filename: String,
    pub kind: String,
    pub status: String,
    pub total_rows: Option<i64>,
    pub processed_rows: i64,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobSummaryResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            filename: job.filename,
            kind: job.kind.as_str().to_string(),
            status: job.status.as_str().to_string(),
            total_rows: job.total_rows,
            processed_rows: job.processed_rows,
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}
