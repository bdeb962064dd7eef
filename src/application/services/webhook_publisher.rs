//! Webhook Publisher
//!
//! Fans a named event out to every enabled subscription listening for it.
//! Grounded on the original's `app/services/webhook_service.py::publish_event`
//! and, for the shape of a shared application service wrapping a
//! repository plus a queue adapter, on `application/services/collection_manager.rs`.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::domain::repositories::WebhookRepository;
use crate::infrastructure::queue::redis_queue::{QueueName, RedisQueue};
use crate::infrastructure::queue::work_item::WorkItem;
use crate::shared::error::ApplicationError;

pub struct WebhookPublisher {
    webhook_repository: Arc<dyn WebhookRepository>,
    queue: Arc<RedisQueue>,
}

impl WebhookPublisher {
    pub fn new(webhook_repository: Arc<dyn WebhookRepository>, queue: Arc<RedisQueue>) -> Self {
        Self { webhook_repository, queue }
    }

    /// Looks up enabled subscriptions for `event_type` and enqueues a
    /// delivery work item for each; the pending delivery row itself is
    /// created by the delivery worker, after it re-checks the subscription
    /// is still enabled. A failure enqueueing one subscription's delivery
    /// is logged and does not prevent the others, and never fails the
    /// caller — webhook fan-out is collateral to whatever primary outcome
    /// triggered it.
    #[instrument(skip(self, payload))]
    pub async fn publish(&self, event_type: &str, payload: serde_json::Value) {
        let subscriptions = match self.webhook_repository.find_subscribed(event_type).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!(event_type, error = %e, "failed to look up webhook subscriptions");
                return;
            }
        };

        for subscription in subscriptions {
            let Some(webhook_id) = subscription.id else { continue };
            if let Err(e) = self.deliver_to(webhook_id, event_type, &payload).await {
                error!(event_type, webhook_id, error = %e, "failed to enqueue webhook delivery");
            }
        }
    }

    /// Enqueues the delivery attempt itself; the pending delivery row is
    /// created by the worker, after it re-checks the subscription is still
    /// enabled, not here.
    async fn deliver_to(&self, webhook_id: i64, event_type: &str, payload: &serde_json::Value) -> Result<(), ApplicationError> {
        let item = WorkItem::new(
            uuid::Uuid::new_v4(),
            "webhook_delivery",
            serde_json::json!({
                "webhook_id": webhook_id,
                "event_type": event_type,
                "payload": payload,
            }),
        );
        self.queue.push(QueueName::Webhook, &item, 0).await?;
        info!(webhook_id, event_type, "webhook delivery queued");
        Ok(())
    }
}
