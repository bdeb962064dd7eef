//! ProductRepository trait
//!
//! Repository interface for catalog product data access.

use async_trait::async_trait;

use crate::domain::entities::{Product, ProductRow};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Finds a product by its SKU (case-insensitive).
    async fn get_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError>;

    /// Finds a product by id.
    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError>;

    /// Returns a page of products.
    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Product>, RepositoryError>;

    /// Returns a page of products filtered by partial name/sku match and active flag.
    async fn list_with_filters(
        &self,
        name_like: Option<&str>,
        sku_like: Option<&str>,
        active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Total number of products.
    async fn count(&self) -> Result<i64, RepositoryError>;

    async fn create(&self, row: &ProductRow) -> Result<i64, RepositoryError>;

    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Deletes up to `limit` products, returning how many rows were removed.
    /// Used by the bulk-delete worker to bound the size of a single batch.
    async fn delete_batch(&self, limit: i64) -> Result<i64, RepositoryError>;

    /// Deduplicates `rows` by lowercased SKU (last write wins), then upserts
    /// all of them in a single statement keyed on `lower(sku)`. Returns the
    /// number of distinct rows written.
    async fn batch_upsert(&self, rows: &[ProductRow]) -> Result<usize, RepositoryError>;
}
