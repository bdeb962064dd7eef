//! Job entity
//!
//! Tracks metadata and progress for a CSV import or bulk-delete request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{JobKind, JobStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub filename: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub total_rows: Option<i64>,
    pub processed_rows: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Builds a freshly queued job, ready to be persisted.
    pub fn new_queued(filename: String, kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename,
            kind,
            status: JobStatus::Queued,
            total_rows: None,
            processed_rows: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
