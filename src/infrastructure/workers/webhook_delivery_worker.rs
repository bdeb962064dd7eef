//! Webhook Delivery Worker (C9)
//!
//! Consumes the `webhook` queue, POSTs each delivery via `WebhookClient`,
//! and records the outcome on the delivery row. Grounded on the
//! original's `app/tasks/webhook_tasks.py`.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::domain::entities::WebhookDeliveryStatus;
use crate::domain::repositories::WebhookRepository;
use crate::infrastructure::queue::redis_queue::{ClaimedWorkItem, QueueName, RedisQueue};
use crate::infrastructure::queue::work_item::WorkItem;
use crate::infrastructure::webhook::webhook_client::WebhookClient;
use crate::shared::error::QueueError;

const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

enum ProcessOutcome {
    BadMessage(String),
    Transient(String),
}

struct DeliveryRequest {
    webhook_id: i64,
    event_type: String,
    payload: serde_json::Value,
}

pub struct WebhookDeliveryWorker {
    webhook_repository: Arc<dyn WebhookRepository>,
    queue: Arc<RedisQueue>,
    client: Arc<WebhookClient>,
}

impl WebhookDeliveryWorker {
    pub fn new(webhook_repository: Arc<dyn WebhookRepository>, queue: Arc<RedisQueue>, client: Arc<WebhookClient>) -> Self {
        Self { webhook_repository, queue, client }
    }

    pub async fn run(self: Arc<Self>) {
        loop {
            match self.queue.claim(QueueName::Webhook).await {
                Ok(Some(claimed)) => self.process_claimed(claimed).await,
                Ok(None) => {
                    if let Err(e) = self.queue.promote_due_retries(QueueName::Webhook).await {
                        warn!(error = %e, "failed to promote due webhook retries");
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => {
                    error!(error = %e, "failed to claim from webhook queue");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn process_claimed(&self, claimed: ClaimedWorkItem) {
        let item_id = claimed.item.id;
        match self.process(&claimed.item).await {
            Ok(()) => {
                if let Err(e) = self.queue.ack(QueueName::Webhook, &claimed).await {
                    error!(item_id = %item_id, error = %e, "failed to ack completed webhook delivery");
                }
            }
            Err(ProcessOutcome::BadMessage(reason)) => {
                warn!(item_id = %item_id, reason, "webhook delivery is a bad message, acking without retry");
                if let Err(e) = self.queue.ack(QueueName::Webhook, &claimed).await {
                    error!(item_id = %item_id, error = %e, "failed to ack bad webhook message");
                }
            }
            Err(ProcessOutcome::Transient(reason)) => match self.queue.nack(QueueName::Webhook, claimed, &reason).await {
                Ok(()) => info!(item_id = %item_id, reason, "webhook delivery nacked for retry"),
                // Retries exhausted: the delivery row was already written as `failed`
                // on the last attempt below, so there is nothing further to finalize.
                Err(QueueError::RetriesExhausted(_)) => info!(item_id = %item_id, "webhook delivery retries exhausted, delivery row stays failed"),
                Err(e) => error!(item_id = %item_id, error = %e, "failed to nack webhook delivery"),
            },
        }
    }

    #[instrument(skip(self, item))]
    async fn process(&self, item: &WorkItem) -> Result<(), ProcessOutcome> {
        let request = parse_request(item)?;

        let subscription = self
            .webhook_repository
            .find_by_id(request.webhook_id)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?
            .ok_or_else(|| ProcessOutcome::BadMessage(format!("webhook {} no longer exists", request.webhook_id)))?;

        if !subscription.enabled {
            info!(webhook_id = request.webhook_id, "webhook disabled since enqueue, skipping delivery");
            return Ok(());
        }

        let delivery_id = self
            .webhook_repository
            .create_delivery(request.webhook_id, &request.event_type, &request.payload)
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        let outcome = self
            .client
            .deliver(&subscription.url, &request.payload)
            .await
            .map_err(|e| ProcessOutcome::BadMessage(e.to_string()))?;

        let status = if outcome.success { WebhookDeliveryStatus::Success } else { WebhookDeliveryStatus::Failed };
        self.webhook_repository
            .complete_delivery(
                delivery_id,
                status,
                outcome.response_code,
                outcome.response_body.as_deref(),
                Some(outcome.response_time_ms),
            )
            .await
            .map_err(|e| ProcessOutcome::Transient(e.to_string()))?;

        if outcome.success {
            Ok(())
        } else {
            Err(ProcessOutcome::Transient(format!(
                "delivery {} to webhook {} returned {:?}",
                delivery_id, request.webhook_id, outcome.response_code
            )))
        }
    }
}

fn parse_request(item: &WorkItem) -> Result<DeliveryRequest, ProcessOutcome> {
    let webhook_id = item
        .payload
        .get("webhook_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ProcessOutcome::BadMessage("payload missing webhook_id".to_string()))?;
    let event_type = item
        .payload
        .get("event_type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProcessOutcome::BadMessage("payload missing event_type".to_string()))?
        .to_string();
    let payload = item
        .payload
        .get("payload")
        .cloned()
        .ok_or_else(|| ProcessOutcome::BadMessage("payload missing payload".to_string()))?;

    Ok(DeliveryRequest { webhook_id, event_type, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(payload: serde_json::Value) -> WorkItem {
        WorkItem::new(uuid::Uuid::new_v4(), "webhook_delivery", payload)
    }

    #[test]
    fn parse_request_reads_all_fields() {
        let work_item = item(serde_json::json!({
            "webhook_id": 7,
            "event_type": "import.completed",
            "payload": {"job_id": "abc"},
        }));
        let request = parse_request(&work_item).ok().expect("valid payload should parse");
        assert_eq!(request.webhook_id, 7);
        assert_eq!(request.event_type, "import.completed");
        assert_eq!(request.payload, serde_json::json!({"job_id": "abc"}));
    }

    #[test]
    fn parse_request_rejects_missing_webhook_id() {
        let work_item = item(serde_json::json!({"event_type": "import.completed", "payload": {}}));
        assert!(matches!(parse_request(&work_item), Err(ProcessOutcome::BadMessage(_))));
    }

    #[test]
    fn parse_request_rejects_missing_event_type() {
        let work_item = item(serde_json::json!({"webhook_id": 7, "payload": {}}));
        assert!(matches!(parse_request(&work_item), Err(ProcessOutcome::BadMessage(_))));
    }

    #[test]
    fn parse_request_rejects_missing_payload() {
        let work_item = item(serde_json::json!({"webhook_id": 7, "event_type": "import.completed"}));
        assert!(matches!(parse_request(&work_item), Err(ProcessOutcome::BadMessage(_))));
    }
}
