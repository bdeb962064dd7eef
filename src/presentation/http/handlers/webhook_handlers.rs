//! Webhook Handlers
//!
//! CRUD HTTP handlers for webhook subscriptions plus a delivery-history
//! listing. Grounded on `media_handlers.rs`'s handler shape, semantics
//! from `original_source/.../app/api/webhooks.py`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::domain::repositories::WebhookRepository;
use crate::presentation::http::dto::webhook_dto::{
    CreateWebhookRequest, WebhookDeliveryResponse, WebhookResponse,
};
use crate::shared::error::RepositoryError;

pub async fn create_webhook(
    State(webhook_repo): State<Arc<dyn WebhookRepository>>,
    Json(request): Json<CreateWebhookRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let subscription = webhook_repo
        .create(&request.url, &request.events)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(WebhookResponse::from(subscription))))
}

pub async fn list_webhooks(
    State(webhook_repo): State<Arc<dyn WebhookRepository>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let subscriptions = webhook_repo.find_all().await.map_err(map_error)?;
    let response: Vec<WebhookResponse> = subscriptions.into_iter().map(WebhookResponse::from).collect();
    Ok(Json(response))
}

pub async fn get_webhook(
    State(webhook_repo): State<Arc<dyn WebhookRepository>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let subscription = webhook_repo
        .find_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("webhook {id} not found")))?;

    Ok(Json(WebhookResponse::from(subscription)))
}

pub async fn delete_webhook(
    State(webhook_repo): State<Arc<dyn WebhookRepository>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    webhook_repo
        .find_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("webhook {id} not found")))?;

    webhook_repo.delete(id).await.map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}

const DEFAULT_DELIVERY_LIMIT: i64 = 50;

pub async fn list_webhook_deliveries(
    State(webhook_repo): State<Arc<dyn WebhookRepository>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    webhook_repo
        .find_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("webhook {id} not found")))?;

    let deliveries = webhook_repo
        .find_deliveries_for_webhook(id, DEFAULT_DELIVERY_LIMIT)
        .await
        .map_err(map_error)?;

    let response: Vec<WebhookDeliveryResponse> = deliveries.into_iter().map(WebhookDeliveryResponse::from).collect();
    Ok(Json(response))
}

fn map_error(e: RepositoryError) -> (StatusCode, String) {
    match e {
        RepositoryError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        RepositoryError::Duplicate(msg) => (StatusCode::CONFLICT, msg),
        other => {
            tracing::error!("webhook repository error: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
        }
    }
}
