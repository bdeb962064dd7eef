//! Job Completed Handler
//!
//! Reacts to job-lifecycle events by fanning the corresponding webhook
//! event out through `WebhookPublisher`, decoupling job completion from
//! delivery enqueueing the way `scan_completed_handler.rs` decouples a
//! finished scan from collection management.

use std::sync::Arc;
use tracing::info;

use crate::application::services::webhook_publisher::WebhookPublisher;
use crate::domain::events::{JobCompletedEvent, JobFailedEvent};
use crate::domain::value_objects::JobKind;
use crate::interfaces::messaging::EventHandler;
use crate::shared::error::{ApplicationError, MessagingError};

pub struct JobCompletedHandler {
    webhook_publisher: Arc<WebhookPublisher>,
}

impl JobCompletedHandler {
    pub fn new(webhook_publisher: Arc<WebhookPublisher>) -> Self {
        Self { webhook_publisher }
    }

    pub async fn handle_completed(&self, event: JobCompletedEvent) -> Result<(), ApplicationError> {
        let (event_type, payload) = match event.kind {
            JobKind::Import => (
                "import.completed",
                serde_json::json!({
                    "job_id": event.job_id,
                    "processed_rows": event.processed_rows,
                    "total_rows": event.total_rows,
                }),
            ),
            JobKind::BulkDelete => (
                "product.bulk_deleted",
                serde_json::json!({
                    "job_id": event.job_id,
                    "deleted_count": event.processed_rows,
                    "total_products": event.total_rows,
                }),
            ),
        };

        info!(job_id = %event.job_id, event_type, "job completed, fanning out");
        self.webhook_publisher.publish(event_type, payload).await;
        Ok(())
    }

    pub async fn handle_failed(&self, event: JobFailedEvent) -> Result<(), ApplicationError> {
        // Bulk-delete has no named failure event in the fan-out taxonomy
        // (see DESIGN.md Open Question resolutions); only ingest failures
        // are published.
        if event.kind != JobKind::Import {
            info!(job_id = %event.job_id, "bulk-delete job failed, no webhook event defined");
            return Ok(());
        }

        let payload = serde_json::json!({
            "job_id": event.job_id,
            "error_message": event.error_message,
        });
        info!(job_id = %event.job_id, "job failed, fanning out import.failed");
        self.webhook_publisher.publish("import.failed", payload).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventHandler<JobCompletedEvent> for JobCompletedHandler {
    async fn handle(&self, event: JobCompletedEvent) -> Result<(), MessagingError> {
        self.handle_completed(event).await.map_err(|e| MessagingError::HandlerError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl EventHandler<JobFailedEvent> for JobCompletedHandler {
    async fn handle(&self, event: JobFailedEvent) -> Result<(), MessagingError> {
        self.handle_failed(event).await.map_err(|e| MessagingError::HandlerError(e.to_string()))
    }
}
