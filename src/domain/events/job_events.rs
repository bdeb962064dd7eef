//! Job lifecycle events
//!
//! Emitted when an import or bulk-delete job reaches a terminal state.
//! The webhook publisher subscribes to these to fan out `import.completed`,
//! `import.failed`, and `product.bulk_deleted` deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::JobKind;

/// Event emitted when a job finishes successfully.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobCompletedEvent {
    pub job_id: Uuid,
    pub kind: JobKind,
    pub processed_rows: i64,
    pub total_rows: i64,
    pub timestamp: DateTime<Utc>,
}

impl JobCompletedEvent {
    pub fn new(job_id: Uuid, kind: JobKind, processed_rows: i64, total_rows: i64) -> Self {
        Self {
            job_id,
            kind,
            processed_rows,
            total_rows,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type() -> &'static str {
        "job_completed"
    }
}

impl crate::interfaces::messaging::DomainEvent for JobCompletedEvent {
    fn event_type(&self) -> &'static str {
        Self::event_type()
    }
}

/// Event emitted when a job fails permanently (retries exhausted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobFailedEvent {
    pub job_id: Uuid,
    pub kind: JobKind,
    pub error_message: String,
    pub timestamp: DateTime<Utc>,
}

impl JobFailedEvent {
    pub fn new(job_id: Uuid, kind: JobKind, error_message: String) -> Self {
        Self {
            job_id,
            kind,
            error_message,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type() -> &'static str {
        "job_failed"
    }
}

impl crate::interfaces::messaging::DomainEvent for JobFailedEvent {
    fn event_type(&self) -> &'static str {
        Self::event_type()
    }
}
