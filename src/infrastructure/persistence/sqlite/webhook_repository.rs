//! SQLite Webhook Repository Implementation
//!
//! Grounded on `media_repository.rs`'s sqlx query/bind/map_row style and on
//! the domain `WebhookSubscription`/`WebhookDelivery` entities.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use crate::domain::entities::{WebhookDelivery, WebhookDeliveryStatus, WebhookSubscription};
use crate::domain::repositories::WebhookRepository;
use crate::shared::error::RepositoryError;

pub struct SqliteWebhookRepository {
    pool: Pool<Sqlite>,
}

impl SqliteWebhookRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn map_subscription(row: sqlx::sqlite::SqliteRow) -> Result<WebhookSubscription, RepositoryError> {
        let events_json: String = row.try_get("events")?;
        let events: Vec<String> = serde_json::from_str(&events_json)
            .map_err(|e| RepositoryError::Deserialization(e.to_string()))?;
        Ok(WebhookSubscription {
            id: Some(row.try_get("id")?),
            url: row.try_get("url")?,
            events,
            enabled: row.try_get("enabled")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_delivery(row: sqlx::sqlite::SqliteRow) -> Result<WebhookDelivery, RepositoryError> {
        let status: String = row.try_get("status")?;
        let payload_json: String = row.try_get("payload")?;
        Ok(WebhookDelivery {
            id: Some(row.try_get("id")?),
            webhook_id: row.try_get("webhook_id")?,
            event_type: row.try_get("event_type")?,
            payload: serde_json::from_str(&payload_json)
                .map_err(|e| RepositoryError::Deserialization(e.to_string()))?,
            status: match status.as_str() {
                "pending" => WebhookDeliveryStatus::Pending,
                "success" => WebhookDeliveryStatus::Success,
                "failed" => WebhookDeliveryStatus::Failed,
                other => return Err(RepositoryError::Deserialization(format!("unknown delivery status: {other}"))),
            },
            response_code: row.try_get("response_code")?,
            response_body: row.try_get("response_body")?,
            response_time_ms: row.try_get("response_time_ms")?,
            attempted_at: row.try_get("attempted_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

#[async_trait]
impl WebhookRepository for SqliteWebhookRepository {
    async fn create(&self, url: &str, events: &[String]) -> Result<WebhookSubscription, RepositoryError> {
        let now = chrono::Utc::now();
        let events_json = serde_json::to_string(events).map_err(|e| RepositoryError::Deserialization(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO webhook_subscriptions (url, events, enabled, created_at, updated_at)
             VALUES (?, ?, 1, ?, ?)",
        )
        .bind(url)
        .bind(&events_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(WebhookSubscription {
            id: Some(result.last_insert_rowid()),
            url: url.to_string(),
            events: events.to_vec(),
            enabled: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<WebhookSubscription>, RepositoryError> {
        let result = sqlx::query("SELECT * FROM webhook_subscriptions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match result {
            Some(row) => Ok(Some(Self::map_subscription(row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<WebhookSubscription>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM webhook_subscriptions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::map_subscription).collect()
    }

    async fn find_subscribed(&self, event_type: &str) -> Result<Vec<WebhookSubscription>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM webhook_subscriptions WHERE enabled = 1")
            .fetch_all(&self.pool)
            .await?;
        let mut subscribed = Vec::new();
        for row in rows {
            let subscription = Self::map_subscription(row)?;
            if subscription.subscribes_to(event_type) {
                subscribed.push(subscription);
            }
        }
        Ok(subscribed)
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM webhook_subscriptions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_delivery(
        &self,
        webhook_id: i64,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, RepositoryError> {
        let payload_json = serde_json::to_string(payload).map_err(|e| RepositoryError::Deserialization(e.to_string()))?;
        let result = sqlx::query(
            "INSERT INTO webhook_deliveries (webhook_id, event_type, payload, status, attempted_at)
             VALUES (?, ?, ?, 'pending', ?)",
        )
        .bind(webhook_id)
        .bind(event_type)
        .bind(&payload_json)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn complete_delivery(
        &self,
        delivery_id: i64,
        status: WebhookDeliveryStatus,
        response_code: Option<i32>,
        response_body: Option<&str>,
        response_time_ms: Option<i64>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE webhook_deliveries SET
                status = ?,
                response_code = ?,
                response_body = ?,
                response_time_ms = ?,
                completed_at = ?
             WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(response_code)
        .bind(response_body)
        .bind(response_time_ms)
        .bind(chrono::Utc::now())
        .bind(delivery_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_deliveries_for_webhook(
        &self,
        webhook_id: i64,
        limit: i64,
    ) -> Result<Vec<WebhookDelivery>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM webhook_deliveries WHERE webhook_id = ? ORDER BY attempted_at DESC LIMIT ?",
        )
        .bind(webhook_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::map_delivery).collect()
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

    #[tokio::test]
    async fn create_and_find_subscription_round_trips() {
        let pool = test_pool().await;
        let repo = SqliteWebhookRepository::new(pool);

        let events = vec!["import.completed".to_string(), "delete.completed".to_string()];
        let created = repo.create("https://example.com/hook", &events).await.unwrap();

        let found = repo.find_by_id(created.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.url, "https://example.com/hook");
        assert_eq!(found.events, events);
        assert!(found.enabled);
    }

    #[tokio::test]
    async fn find_subscribed_filters_by_event_and_enabled() {
        let pool = test_pool().await;
        let repo = SqliteWebhookRepository::new(pool);

        repo.create("https://a.example.com", &["import.completed".to_string()])
            .await
            .unwrap();
        repo.create("https://b.example.com", &["delete.completed".to_string()])
            .await
            .unwrap();

        let subscribed = repo.find_subscribed("import.completed").await.unwrap();
        assert_eq!(subscribed.len(), 1);
        assert_eq!(subscribed[0].url, "https://a.example.com");
    }

    #[tokio::test]
    async fn delivery_lifecycle_records_terminal_outcome() {
        let pool = test_pool().await;
        let repo = SqliteWebhookRepository::new(pool);
        let subscription = repo
            .create("https://example.com/hook", &["import.completed".to_string()])
            .await
            .unwrap();

        let payload = serde_json::json!({"job_id": "abc"});
        let delivery_id = repo
            .create_delivery(subscription.id.unwrap(), "import.completed", &payload)
            .await
            .unwrap();

        repo.complete_delivery(delivery_id, WebhookDeliveryStatus::Success, Some(200), Some("ok"), Some(42))
            .await
            .unwrap();

        let deliveries = repo
            .find_deliveries_for_webhook(subscription.id.unwrap(), 10)
            .await
            .unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].status, WebhookDeliveryStatus::Success);
        assert_eq!(deliveries[0].response_code, Some(200));
    }
}
