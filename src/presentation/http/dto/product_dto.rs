//! Product CRUD DTOs
//!
//! Grounded on `series_dto.rs`'s response/request shape; supplements
//! spec.md's product CRUD routes (shapes only, per §6) with request
//! bodies and a filtered-list query, per DESIGN.md's grounding on
//! `original_source/.../app/api/products.py`.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Product, ProductRow};

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.unwrap_or(0),
            sku: product.sku,
            name: product.name,
            description: product.description,
            active: product.active,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CreateProductRequest> for ProductRow {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            sku: request.sku,
            name: request.name,
            description: request.description,
            active: request.active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}
