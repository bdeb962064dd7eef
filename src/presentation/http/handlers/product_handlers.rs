//! Product Handlers
//!
//! CRUD HTTP handlers for catalog products. Grounded on
//! `media_handlers.rs`'s State-extractor/DTO/`Result<impl IntoResponse,
//! (StatusCode, String)>` shape, semantics from
//! `original_source/.../app/api/products.py`. Create/update/delete each
//! fan a named event out through `WebhookPublisher`, per spec.md §4.8's
//! `product.created` / `product.updated` / `product.deleted` events.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::services::webhook_publisher::WebhookPublisher;
use crate::domain::repositories::ProductRepository;
use crate::presentation::http::dto::product_dto::{
    CreateProductRequest, ListProductsQuery, ProductResponse, UpdateProductRequest,
};
use crate::shared::error::RepositoryError;

pub async fn list_products(
    State(product_repo): State<Arc<dyn ProductRepository>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let products = product_repo
        .list_with_filters(
            query.name.as_deref(),
            query.sku.as_deref(),
            query.active,
            query.limit,
            query.offset,
        )
        .await
        .map_err(map_error)?;

    let response: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(Json(response))
}

pub async fn get_product(
    State(product_repo): State<Arc<dyn ProductRepository>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let product = product_repo
        .get_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("product {id} not found")))?;

    Ok(Json(ProductResponse::from(product)))
}

pub async fn get_product_by_sku(
    State(product_repo): State<Arc<dyn ProductRepository>>,
    Path(sku): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let product = product_repo
        .get_by_sku(&sku)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("product with sku {sku} not found")))?;

    Ok(Json(ProductResponse::from(product)))
}

pub async fn create_product(
    State(product_repo): State<Arc<dyn ProductRepository>>,
    State(webhook_publisher): State<Arc<WebhookPublisher>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let row = request.into();
    let id = product_repo.create(&row).await.map_err(map_error)?;

    let product = product_repo
        .get_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::INTERNAL_SERVER_ERROR, "product vanished after create".to_string()))?;

    let response = ProductResponse::from(product);
    webhook_publisher
        .publish("product.created", serde_json::to_value(&response).unwrap_or_default())
        .await;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_product(
    State(product_repo): State<Arc<dyn ProductRepository>>,
    State(webhook_publisher): State<Arc<WebhookPublisher>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut product = product_repo
        .get_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("product {id} not found")))?;

    if let Some(name) = request.name {
        product.name = name;
    }
    if let Some(description) = request.description {
        product.description = Some(description);
    }
    if let Some(active) = request.active {
        product.active = active;
    }
    product.updated_at = chrono::Utc::now();

    product_repo.update(&product).await.map_err(map_error)?;

    let response = ProductResponse::from(product);
    webhook_publisher
        .publish("product.updated", serde_json::to_value(&response).unwrap_or_default())
        .await;

    Ok(Json(response))
}

pub async fn delete_product(
    State(product_repo): State<Arc<dyn ProductRepository>>,
    State(webhook_publisher): State<Arc<WebhookPublisher>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let product = product_repo
        .get_by_id(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("product {id} not found")))?;

    product_repo.delete(id).await.map_err(map_error)?;

    webhook_publisher
        .publish("product.deleted", serde_json::json!({ "id": id, "sku": product.sku }))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

fn map_error(e: RepositoryError) -> (StatusCode, String) {
    match e {
        RepositoryError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        RepositoryError::Duplicate(msg) => (StatusCode::CONFLICT, msg),
        other => {
            tracing::error!("product repository error: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
        }
    }
}
