//! Work item envelope pushed onto a queue list.
//!
//! A work item carries a stable id (the job id for ingest/bulk-delete work,
//! enabling worker-side singleton-per-job correlation), a kind tag used to
//! route it to a handler, a JSON payload, and a retry counter the queue
//! bumps on re-delivery.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub retry_count: u32,
}

impl WorkItem {
    pub fn new(id: Uuid, kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id,
            kind: kind.into(),
            payload,
            retry_count: 0,
        }
    }

    pub fn with_incremented_retry(mut self) -> Self {
        self.retry_count += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_incremented_retry_bumps_counter_only() {
        let item = WorkItem::new(Uuid::new_v4(), "ingest", serde_json::json!({"a": 1}));
        let retried = item.clone().with_incremented_retry();
        assert_eq!(retried.retry_count, 1);
        assert_eq!(retried.id, item.id);
        assert_eq!(retried.kind, item.kind);
    }
}
