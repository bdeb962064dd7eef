//! WebhookRepository trait
//!
//! Repository interface for webhook subscription and delivery data access.

use async_trait::async_trait;

use crate::domain::entities::{WebhookDelivery, WebhookDeliveryStatus, WebhookSubscription};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn create(&self, url: &str, events: &[String]) -> Result<WebhookSubscription, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<WebhookSubscription>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<WebhookSubscription>, RepositoryError>;

    /// Finds enabled subscriptions whose `events` list contains `event_type`.
    async fn find_subscribed(&self, event_type: &str) -> Result<Vec<WebhookSubscription>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Inserts a delivery row in `pending` status, returning its id.
    async fn create_delivery(
        &self,
        webhook_id: i64,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, RepositoryError>;

    /// Writes the terminal outcome of a delivery attempt exactly once.
    async fn complete_delivery(
        &self,
        delivery_id: i64,
        status: WebhookDeliveryStatus,
        response_code: Option<i32>,
        response_body: Option<&str>,
        response_time_ms: Option<i64>,
    ) -> Result<(), RepositoryError>;

    async fn find_deliveries_for_webhook(
        &self,
        webhook_id: i64,
        limit: i64,
    ) -> Result<Vec<WebhookDelivery>, RepositoryError>;
}
