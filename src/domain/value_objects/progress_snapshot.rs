//! ProgressSnapshot value object
//!
//! The payload shape written to the progress store (C1) and streamed
//! over SSE (C8). Mirrors the JSON dict built by the original worker's
//! progress trackers field-for-field so downstream consumers don't see
//! a shape change between the durable snapshot and the live pub/sub feed.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::JobStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub status: JobStatus,
    pub processed_rows: i64,
    pub total_rows: i64,
    pub progress: Option<f64>,
    pub updated_at: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProgressSnapshot {
    pub fn new(status: JobStatus, processed_rows: i64, total_rows: i64, updated_at: f64) -> Self {
        let progress = if total_rows > 0 {
            let pct = (processed_rows as f64 / total_rows as f64) * 100.0;
            Some((pct * 100.0).round() / 100.0)
        } else {
            None
        };

        Self {
            status,
            processed_rows,
            total_rows,
            progress,
            updated_at,
            stage: None,
            error_message: None,
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_percentage_and_rounds_to_two_decimals() {
        let snap = ProgressSnapshot::new(JobStatus::Importing, 1, 3, 0.0);
        assert_eq!(snap.progress, Some(33.33));
    }

    #[test]
    fn zero_total_is_null_progress_not_zero_percent() {
        let snap = ProgressSnapshot::new(JobStatus::Queued, 0, 0, 0.0);
        assert_eq!(snap.progress, None);
    }

    #[test]
    fn zero_total_serializes_progress_as_json_null() {
        let snap = ProgressSnapshot::new(JobStatus::Queued, 0, 0, 0.0);
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["progress"], serde_json::Value::Null);
    }
}
