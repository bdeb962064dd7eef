//! Bulk-Delete Worker (C7)
//!
//! Shares C6's job state machine and `ProgressEmitter`, grounded on the
//! original's `app/tasks/bulk_delete_tasks.py`. Deletes products in
//! batches of up to 10,000 via `ProductRepository::delete_batch`, which
//! already performs the fetch-ids-then-delete step as one transaction.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::application::services::progress_emitter::ProgressEmitter;
use crate::domain::entities::Job;
use crate::domain::events::{JobCompletedEvent, JobFailedEvent};
use crate::domain::repositories::{JobRepository, ProductRepository};
use crate::domain::value_objects::{JobKind, JobStatus};
use crate::infrastructure::queue::redis_queue::{ClaimedWorkItem, QueueName, RedisQueue};
use crate::infrastructure::queue::work_item::WorkItem;
use crate::interfaces::messaging::EventBus;
use crate::shared::error::QueueError;

const BATCH_SIZE: i64 = 10_000;
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

enum ProcessOutcome {
    BadMessage(String),
    Transient(String),
}

pub struct BulkDeleteWorker<E: EventBus + ?Sized> {
    job_repository: Arc<dyn JobRepository>,
    product_repository: Arc<dyn ProductRepository>,
    queue: Arc<RedisQueue>,
    progress_emitter: Arc<ProgressEmitter>,
    event_bus: Arc<E>,
}

impl<E: EventBus + ?Sized> BulkDeleteWorker<E> {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        product_repository: Arc<dyn ProductRepository>,
        queue: Arc<RedisQueue>,
        progress_emitter: Arc<ProgressEmitter>,
        event_bus: Arc<E>,
    ) -> Self {
        Self {
            job_repository,
            product_repository,
            queue,
            progress_emitter,
            event_bus,
        }
    }

    pub async fn run(self: Arc<Self>) {
        loop {
            match self.queue.claim(QueueName::BulkOps).await {
                Ok(Some(claimed)) => self.process_claimed(claimed).await,
                Ok(None) => {
                    if let Err(e) = self.queue.promote_due_retries(QueueName::BulkOps).await {
                        warn!(error = %e, "failed to promote due bulk-delete retries");
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => {
                    error!(error = %e, "failed to claim from bulk_ops queue");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn process_claimed(&self, claimed: ClaimedWorkItem) {
        let job_id = claimed.item.id;
        match self.process(&claimed.item).await {
            Ok(()) => {
                if let Err(e) = self.queue.ack(QueueName::BulkOps, &claimed).await {
                    error!(job_id = %job_id, error = %e, "failed to ack completed bulk-delete item");
                }
            }
            Err(ProcessOutcome::BadMessage(reason)) => {
                warn!(job_id = %job_id, reason, "bulk-delete work item is a bad message, acking without retry");
                if let Err(e) = self.queue.ack(QueueName::BulkOps, &claimed).await {
                    error!(job_id = %job_id, error = %e, "failed to ack bad bulk-delete message");
                }
            }
            Err(ProcessOutcome::Transient(reason)) => match self.queue.nack(QueueName::BulkOps, claimed, &reason).await {
                Ok(()) => info!(job_id = %job_id, reason, "bulk-delete item nacked for retry"),
                Err(QueueError::RetriesExhausted(_)) => self.finalize_failed(job_id, &reason).await,
                Err(e) => error!(job_id = %job_id, error = %e, "failed to nack bulk-delete item"),
            },
        }
    }

    #[instrument(skip(self, item))]
    async fn process(&self, item: &WorkItem) -> Result<(), ProcessOutcome> {
        let job_id = item.id;

        let job: Job = self
            .job_repository
            .find_by_id(job_id)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?
            .ok_or_else(|| ProcessOutcome::BadMessage("job row not found".to_string()))?;

        if job.kind != JobKind::BulkDelete {
            return Err(ProcessOutcome::BadMessage(format!("job {job_id} is not a bulk-delete job")));
        }

        let total_products = self.product_repository.count().await.map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        self.progress_emitter
            .emit(job_id, JobStatus::Parsing, 0, total_products, Some("starting"), None, true)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        if total_products == 0 {
            return self.finalize_done(job_id, 0, 0).await;
        }

        self.progress_emitter
            .emit(job_id, JobStatus::Importing, 0, total_products, Some("deleting"), None, true)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        let mut deleted: i64 = 0;
        loop {
            let removed = self
                .product_repository
                .delete_batch(BATCH_SIZE)
                .await
                .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;
            if removed == 0 {
                break;
            }
            deleted += removed;
            info!(job_id = %job_id, deleted, "bulk-delete batch removed");
            self.progress_emitter
                .emit(job_id, JobStatus::Importing, deleted, total_products, Some("deleting"), None, true)
                .await
                .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;
        }

        self.finalize_done(job_id, deleted, total_products).await
    }

    async fn finalize_done(&self, job_id: Uuid, deleted: i64, total_products: i64) -> Result<(), ProcessOutcome> {
        self.progress_emitter
            .emit(job_id, JobStatus::Done, deleted, total_products, Some("completed"), None, true)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;
        self.progress_emitter.forget(job_id).await;

        let event = JobCompletedEvent::new(job_id, JobKind::BulkDelete, deleted, total_products);
        if let Err(e) = self.event_bus.publish(event).await {
            error!(job_id = %job_id, error = %e, "failed to publish product.bulk_deleted event");
        }
        Ok(())
    }

    async fn finalize_failed(&self, job_id: Uuid, reason: &str) {
        let message = format!("worker: {reason}");
        let (deleted, total) = self.last_known_progress(job_id).await;
        if let Err(e) = self
            .progress_emitter
            .emit(job_id, JobStatus::Failed, deleted, total, Some("failed"), Some(&message), true)
            .await
        {
            error!(job_id = %job_id, error = %e, "failed to publish final failed snapshot");
        }
        self.progress_emitter.forget(job_id).await;

        let event = JobFailedEvent::new(job_id, JobKind::BulkDelete, message);
        if let Err(e) = self.event_bus.publish(event).await {
            error!(job_id = %job_id, error = %e, "failed to publish bulk-delete failure event");
        }
    }

    /// Products already removed by earlier batches are durable in the job
    /// row; the failed snapshot should report them rather than resetting to 0.
    async fn last_known_progress(&self, job_id: Uuid) -> (i64, i64) {
        match self.job_repository.find_by_id(job_id).await {
            Ok(Some(job)) => (job.processed_rows, job.total_rows.unwrap_or(0)),
            _ => (0, 0),
        }
    }
}
