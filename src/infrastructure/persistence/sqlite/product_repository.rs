//! SQLite Product Repository Implementation
//!
//! `batch_upsert` is grounded on the original's
//! `app/services/product_repository.py::batch_upsert`: dedupe the
//! incoming batch by `lower(sku)` keeping the last occurrence, skip blank
//! SKUs, then a single `INSERT ... ON CONFLICT(lower(sku)) DO UPDATE`
//! statement. The unique index is declared on the expression `lower(sku)`
//! so SQLite accepts it as a conflict target (3.24+, supported by
//! sqlx-sqlite).

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::entities::{Product, ProductRow};
use crate::domain::repositories::ProductRepository;
use crate::shared::error::RepositoryError;

pub struct SqliteProductRepository {
    pool: Pool<Sqlite>,
}

impl SqliteProductRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
        Ok(Product {
            id: Some(row.try_get("id")?),
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn get_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let result = sqlx::query("SELECT * FROM products WHERE lower(sku) = lower(?)")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        match result {
            Some(row) => Ok(Some(Self::map_row(row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let result = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match result {
            Some(row) => Ok(Some(Self::map_row(row)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY id LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::map_row).collect()
    }

    async fn list_with_filters(
        &self,
        name_like: Option<&str>,
        sku_like: Option<&str>,
        active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut sql = String::from("SELECT * FROM products WHERE 1 = 1");
        if name_like.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        if sku_like.is_some() {
            sql.push_str(" AND sku LIKE ?");
        }
        if active.is_some() {
            sql.push_str(" AND active = ?");
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(name) = name_like {
            query = query.bind(format!("%{name}%"));
        }
        if let Some(sku) = sku_like {
            query = query.bind(format!("%{sku}%"));
        }
        if let Some(active) = active {
            query = query.bind(active);
        }
        query = query.bind(limit).bind(offset);

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::map_row).collect()
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.try_get("count")?)
    }

    async fn create(&self, row: &ProductRow) -> Result<i64, RepositoryError> {
        let now = chrono::Utc::now();
        let result = sqlx::query(
            "INSERT INTO products (sku, name, description, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(row.sku.trim())
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let id = product
            .id
            .ok_or_else(|| RepositoryError::InvalidInput("product id is required".into()))?;
        sqlx::query(
            "UPDATE products SET sku = ?, name = ?, description = ?, active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(product.sku.trim())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.active)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_batch(&self, limit: i64) -> Result<i64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i64> = sqlx::query("SELECT id FROM products LIMIT ?")
            .bind(limit)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(|row| row.try_get::<i64, _>("id"))
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!("DELETE FROM products WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let result = query.execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() as i64)
    }

    async fn batch_upsert(&self, rows: &[ProductRow]) -> Result<usize, RepositoryError> {
        let mut deduped: HashMap<String, &ProductRow> = HashMap::new();
        for row in rows {
            let sku = row.sku.trim();
            if sku.is_empty() {
                continue;
            }
            deduped.insert(sku.to_lowercase(), row);
        }

        if deduped.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now();
        let placeholders = deduped.iter().map(|_| "(?, ?, ?, ?, ?, ?)").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "INSERT INTO products (sku, name, description, active, created_at, updated_at)
             VALUES {placeholders}
             ON CONFLICT(lower(sku)) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                active = excluded.active,
                updated_at = excluded.updated_at"
        );

        let mut query = sqlx::query(&sql);
        for row in deduped.values() {
            query = query
                .bind(row.sku.trim())
                .bind(&row.name)
                .bind(&row.description)
                .bind(row.active)
                .bind(now)
                .bind(now);
        }
        query.execute(&self.pool).await?;

        Ok(deduped.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::infrastructure::database::initialize_schema(&pool).await.unwrap();
        pool
    }

    fn row(sku: &str, name: &str) -> ProductRow {
        ProductRow {
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn batch_upsert_dedupes_case_insensitive_sku_keeping_last() {
        let pool = test_pool().await;
        let repo = SqliteProductRepository::new(pool);

        let rows = vec![row("sku-1", "A"), row("SKU-1", "B")];
        let affected = repo.batch_upsert(&rows).await.unwrap();
        assert_eq!(affected, 1);

        let product = repo.get_by_sku("sku-1").await.unwrap().unwrap();
        assert_eq!(product.name, "B");
    }

    #[tokio::test]
    async fn batch_upsert_skips_blank_skus() {
        let pool = test_pool().await;
        let repo = SqliteProductRepository::new(pool);

        let rows = vec![row("  ", "Ignored"), row("sku-2", "Kept")];
        let affected = repo.batch_upsert(&rows).await.unwrap();
        assert_eq!(affected, 1);
        assert!(repo.get_by_sku("sku-2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn batch_upsert_is_idempotent_across_runs() {
        let pool = test_pool().await;
        let repo = SqliteProductRepository::new(pool);

        let rows = vec![row("sku-3", "Widget")];
        repo.batch_upsert(&rows).await.unwrap();
        repo.batch_upsert(&rows).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_batch_removes_up_to_limit() {
        let pool = test_pool().await;
        let repo = SqliteProductRepository::new(pool);
        repo.batch_upsert(&[row("sku-a", "A"), row("sku-b", "B"), row("sku-c", "C")])
            .await
            .unwrap();

        let deleted = repo.delete_batch(2).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
