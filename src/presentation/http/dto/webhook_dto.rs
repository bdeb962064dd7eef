//! Webhook subscription/delivery DTOs
//!
//! Grounded on `series_dto.rs`'s response shape; supplements spec.md's
//! webhook CRUD routes (shapes only, per §6) with request bodies and a
//! delivery-history response, per DESIGN.md's grounding on
//! `original_source/.../app/api/webhooks.py`.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{WebhookDelivery, WebhookSubscription};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub id: i64,
    pub url: String,
    pub events: Vec<String>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<WebhookSubscription> for WebhookResponse {
    fn from(subscription: WebhookSubscription) -> Self {
        Self {
            id: subscription.id.unwrap_or(0),
            url: subscription.url,
            events: subscription.events,
            enabled: subscription.enabled,
            created_at: subscription.created_at.to_rfc3339(),
            updated_at: subscription.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookDeliveryResponse {
    pub id: i64,
    pub webhook_id: i64,
    pub event_type: String,
    pub status: String,
    pub response_code: Option<i32>,
    pub response_time_ms: Option<i64>,
    pub attempted_at: String,
    pub completed_at: Option<String>,
}

impl From<WebhookDelivery> for WebhookDeliveryResponse {
    fn from(delivery: WebhookDelivery) -> Self {
        Self {
            id: delivery.id.unwrap_or(0),
            webhook_id: delivery.webhook_id,
            event_type: delivery.event_type,
            status: delivery.status.as_str().to_string(),
            response_code: delivery.response_code,
            response_time_ms: delivery.response_time_ms,
            attempted_at: delivery.attempted_at.to_rfc3339(),
            completed_at: delivery.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}
