//! Ingest Worker (C6)
//!
//! Consumes the `ingest` queue, streaming the uploaded CSV in 10,000-row
//! batches into the product store. Grounded on the original's
//! `app/tasks/import_tasks.py` for the state-machine steps and retry
//! semantics, and on `main.rs`'s background-scanner `tokio::spawn` loop
//! for the worker-loop shape.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::entities::ProductRow;
use crate::domain::events::{JobCompletedEvent, JobFailedEvent};
use crate::domain::repositories::{JobRepository, ProductRepository};
use crate::domain::services::validation_service::parse_bool;
use crate::domain::value_objects::{JobKind, JobStatus};
use crate::application::services::progress_emitter::ProgressEmitter;
use crate::infrastructure::queue::redis_queue::{ClaimedWorkItem, QueueName, RedisQueue};
use crate::infrastructure::queue::work_item::WorkItem;
use crate::interfaces::messaging::EventBus;
use crate::shared::error::QueueError;

const BATCH_SIZE: usize = 10_000;
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

/// Why a claimed work item did not complete successfully.
enum ProcessOutcome {
    /// Malformed or no-longer-meaningful message (job row gone, wrong
    /// kind, missing payload field). Acked without a retry.
    BadMessage(String),
    /// Might succeed on redelivery (database/queue hiccup). Nacked,
    /// which schedules a backoff retry or routes to the DLQ once
    /// retries are exhausted.
    Transient(String),
    /// Known not to be fixed by retrying (file vanished, bad encoding).
    /// Finalizes the job as `failed` immediately.
    Terminal(String),
}

pub struct IngestWorker<E: EventBus + ?Sized> {
    job_repository: Arc<dyn JobRepository>,
    product_repository: Arc<dyn ProductRepository>,
    queue: Arc<RedisQueue>,
    progress_emitter: Arc<ProgressEmitter>,
    event_bus: Arc<E>,
}

impl<E: EventBus + ?Sized> IngestWorker<E> {
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

    /// Runs the claim/process/ack loop forever. Intended to be spawned
    /// once per pool slot (`WORKER_CONCURRENCY`).
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.queue.claim(QueueName::Ingest).await {
                Ok(Some(claimed)) => self.process_claimed(claimed).await,
                Ok(None) => {
                    if let Err(e) = self.queue.promote_due_retries(QueueName::Ingest).await {
                        warn!(error = %e, "failed to promote due ingest retries");
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => {
                    error!(error = %e, "failed to claim from ingest queue");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn process_claimed(&self, claimed: ClaimedWorkItem) {
        let job_id = claimed.item.id;
        match self.process(&claimed.item).await {
            Ok(()) => {
                if let Err(e) = self.queue.ack(QueueName::Ingest, &claimed).await {
                    error!(job_id = %job_id, error = %e, "failed to ack completed ingest item");
                }
            }
            Err(ProcessOutcome::BadMessage(reason)) => {
                warn!(job_id = %job_id, reason, "ingest work item is a bad message, acking without retry");
                if let Err(e) = self.queue.ack(QueueName::Ingest, &claimed).await {
                    error!(job_id = %job_id, error = %e, "failed to ack bad ingest message");
                }
            }
            Err(ProcessOutcome::Terminal(reason)) => {
                self.finalize_failed(job_id, &reason).await;
                if let Err(e) = self.queue.ack(QueueName::Ingest, &claimed).await {
                    error!(job_id = %job_id, error = %e, "failed to ack terminally failed ingest item");
                }
            }
            Err(ProcessOutcome::Transient(reason)) => match self.queue.nack(QueueName::Ingest, claimed, &reason).await {
                Ok(()) => info!(job_id = %job_id, reason, "ingest item nacked for retry"),
                Err(QueueError::RetriesExhausted(_)) => self.finalize_failed(job_id, &reason).await,
                Err(e) => error!(job_id = %job_id, error = %e, "failed to nack ingest item"),
            },
        }
    }

    #[instrument(skip(self, item))]
    async fn process(&self, item: &WorkItem) -> Result<(), ProcessOutcome> {
        let job_id = item.id;

        let job = self
            .job_repository
            .find_by_id(job_id)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?
            .ok_or_else(|| ProcessOutcome::BadMessage("job row not found".to_string()))?;

        if job.kind != JobKind::Import {
            return Err(ProcessOutcome::BadMessage(format!("job {job_id} is not an import job")));
        }
        let total_rows = job
            .total_rows
            .ok_or_else(|| ProcessOutcome::BadMessage("job has no total_rows estimate".to_string()))?;

        let file_path = item
            .payload
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProcessOutcome::BadMessage("payload missing file_path".to_string()))?
            .to_string();
        let path = Path::new(&file_path);

        self.progress_emitter
            .emit(job_id, JobStatus::Parsing, 0, total_rows, Some("starting"), None, true)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        self.progress_emitter
            .emit(job_id, JobStatus::Importing, 0, total_rows, Some("batch_0"), None, false)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        let processed = self.stream_upsert(job_id, path, total_rows).await?;

        self.progress_emitter
            .emit(job_id, JobStatus::Done, processed, total_rows, Some("completed"), None, true)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;
        self.progress_emitter.forget(job_id).await;

        let event = JobCompletedEvent::new(job_id, JobKind::Import, processed, total_rows);
        if let Err(e) = self.event_bus.publish(event).await {
            error!(job_id = %job_id, error = %e, "failed to publish import.completed event");
        }

        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(job_id = %job_id, error = %e, "failed to remove processed upload file");
        }

        Ok(())
    }

    /// Streams `path`, upserting in batches of `BATCH_SIZE`, publishing a
    /// forced progress update at each batch boundary. Returns the total
    /// number of rows successfully applied.
    async fn stream_upsert(&self, job_id: Uuid, path: &Path, total_rows: i64) -> Result<i64, ProcessOutcome> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| ProcessOutcome::Terminal(format!("input: cannot open file: {e}")))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ProcessOutcome::Terminal(format!("input: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut batch: Vec<ProductRow> = Vec::with_capacity(BATCH_SIZE);
        let mut processed: i64 = 0;
        let mut batch_index: u64 = 0;
        let mut record = csv::StringRecord::new();

        loop {
            let has_record = reader
                .read_record(&mut record)
                .map_err(|e| ProcessOutcome::Terminal(format!("input: row parse error: {e}")))?;
            if !has_record {
                break;
            }

            let raw: HashMap<String, String> = headers.iter().zip(record.iter()).map(|(h, v)| (h.clone(), v.trim().to_string())).collect();
            let row_number = processed as usize + batch.len() + 1;

            match parse_ingest_row(&raw) {
                Some(row) => batch.push(row),
                None => warn!(job_id = %job_id, row = row_number, "skipping ingest row with empty sku or name"),
            }

            if batch.len() >= BATCH_SIZE {
                processed += self.flush_batch(job_id, &mut batch, &mut batch_index, processed, total_rows, false).await?;
            }
        }

        if !batch.is_empty() {
            processed += self.flush_batch(job_id, &mut batch, &mut batch_index, processed, total_rows, true).await?;
        }

        Ok(processed)
    }

    #[allow(clippy::too_many_arguments)]
    async fn flush_batch(
        &self,
        job_id: Uuid,
        batch: &mut Vec<ProductRow>,
        batch_index: &mut u64,
        processed_before: i64,
        total_rows: i64,
        is_final: bool,
    ) -> Result<i64, ProcessOutcome> {
        let written = self
            .product_repository
            .batch_upsert(batch)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;
        let flushed_rows = batch.len() as i64;
        batch.clear();

        let processed = processed_before + flushed_rows;
        let stage = if is_final {
            format!("batch_{}_final", *batch_index)
        } else {
            let label = format!("batch_{}", *batch_index);
            *batch_index += 1;
            label
        };

        info!(job_id = %job_id, stage, written, processed, "ingest batch flushed");

        self.progress_emitter
            .emit(job_id, JobStatus::Importing, processed, total_rows, Some(&stage), None, true)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        Ok(flushed_rows)
    }

    async fn finalize_failed(&self, job_id: Uuid, reason: &str) {
        let message = classify_error(reason);
        let (processed, total) = self.last_known_progress(job_id).await;
        if let Err(e) = self
            .progress_emitter
            .emit(job_id, JobStatus::Failed, processed, total, Some("failed"), Some(&message), true)
            .await
        {
            error!(job_id = %job_id, error = %e, "failed to publish final failed snapshot");
        }
        self.progress_emitter.forget(job_id).await;

        let event = JobFailedEvent::new(job_id, JobKind::Import, message);
        if let Err(e) = self.event_bus.publish(event).await {
            error!(job_id = %job_id, error = %e, "failed to publish import.failed event");
        }
    }

    /// Rows already flushed by earlier batches are durable in the job row;
    /// the failed snapshot should report them rather than resetting to 0.
    async fn last_known_progress(&self, job_id: Uuid) -> (i64, i64) {
        match self.job_repository.find_by_id(job_id).await {
            Ok(Some(job)) => (job.processed_rows, job.total_rows.unwrap_or(0)),
            _ => (0, 0),
        }
    }
}

/// Converts one raw CSV row into a `ProductRow`, skipping only rows with an
/// empty sku or name. Unlike C4's pre-flight `DefaultValidationService`,
/// an unparseable `active` value does not drop the row — it defaults to
/// `true`, matching the original's `_parse_csv_row`.
fn parse_ingest_row(raw: &HashMap<String, String>) -> Option<ProductRow> {
    let sku = raw.get("sku").map(|s| s.trim()).unwrap_or("");
    let name = raw.get("name").map(|s| s.trim()).unwrap_or("");
    if sku.is_empty() || name.is_empty() {
        return None;
    }

    let description = raw
        .get("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let active = raw
        .get("active")
        .map(|value| parse_bool(value).unwrap_or(true))
        .unwrap_or(true);

    Some(ProductRow {
        sku: sku.to_string(),
        name: name.to_string(),
        description,
        active,
    })
}

/// Prefixes an error description with its failure kind, per the
/// `"<kind>: <detail>"` convention for job error messages.
fn classify_error(reason: &str) -> String {
    if reason.starts_with("input:") {
        reason.to_string()
    } else {
        format!("worker: {reason}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_error_keeps_existing_input_prefix() {
        assert_eq!(classify_error("input: bad encoding"), "input: bad encoding");
    }

    #[test]
    fn classify_error_prefixes_unclassified_reasons() {
        assert_eq!(classify_error("retries exhausted"), "worker: retries exhausted");
    }

    fn raw_row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parse_ingest_row_defaults_unparseable_active_to_true() {
        let raw = raw_row(&[("sku", "ABC-1"), ("name", "Widget"), ("active", "maybe")]);
        let row = parse_ingest_row(&raw).expect("row has non-empty sku and name");
        assert!(row.active);
    }

    #[test]
    fn parse_ingest_row_rejects_empty_sku() {
        let raw = raw_row(&[("sku", ""), ("name", "Widget")]);
        assert!(parse_ingest_row(&raw).is_none());
    }

    #[test]
    fn parse_ingest_row_rejects_empty_name() {
        let raw = raw_row(&[("sku", "ABC-1"), ("name", "")]);
        assert!(parse_ingest_row(&raw).is_none());
    }

    #[test]
    fn parse_ingest_row_honors_explicit_active_false() {
        let raw = raw_row(&[("sku", "ABC-1"), ("name", "Widget"), ("active", "no")]);
        let row = parse_ingest_row(&raw).expect("row has non-empty sku and name");
        assert!(!row.active);
    }
}
