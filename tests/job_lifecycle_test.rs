//! Integration tests exercising the job lifecycle against an in-memory
//! SQLite pool: status transitions, terminal-state immutability, and the
//! webhook subscription/delivery cascade-on-delete.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use catalogd::domain::entities::Job;
use catalogd::domain::repositories::{JobRepository, WebhookRepository};
use catalogd::domain::value_objects::{JobKind, JobStatus};
use catalogd::infrastructure::database::initialize_schema;
use catalogd::infrastructure::persistence::sqlite::{SqliteJobRepository, SqliteWebhookRepository};

async fn test_pool() -> Pool<Sqlite> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .pragma("foreign_keys", "ON");
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await.unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn job_advances_through_its_lifecycle() {
    let pool = test_pool().await;
    let repo = SqliteJobRepository::new(pool);
    let job = Job::new_queued("catalog.csv".to_string(), JobKind::Import);
    repo.create(&job).await.unwrap();

    repo.update_status(job.id, JobStatus::Parsing, Some(500), None, None).await.unwrap();
    repo.update_status(job.id, JobStatus::Importing, None, Some(250), None).await.unwrap();
    repo.update_status(job.id, JobStatus::Importing, None, Some(500), None).await.unwrap();
    repo.update_status(job.id, JobStatus::Done, None, None, None).await.unwrap();

    let found = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Done);
    assert_eq!(found.total_rows, Some(500));
    assert_eq!(found.processed_rows, 500);
}

#[tokio::test]
async fn terminal_job_rejects_further_mutation() {
    let pool = test_pool().await;
    let repo = SqliteJobRepository::new(pool);
    let job = Job::new_queued("catalog.csv".to_string(), JobKind::Import);
    repo.create(&job).await.unwrap();

    repo.update_status(job.id, JobStatus::Failed, Some(500), Some(120), Some("input: bad encoding"))
        .await
        .unwrap();

    // A late retry attempt must not resurrect or further mutate a failed job.
    repo.update_status(job.id, JobStatus::Importing, None, Some(500), None).await.unwrap();

    let found = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Failed);
    assert_eq!(found.processed_rows, 120);
    assert_eq!(found.error_message.as_deref(), Some("input: bad encoding"));
}

#[tokio::test]
async fn deleting_a_subscription_cascades_to_its_deliveries() {
    let pool = test_pool().await;
    let repo = SqliteWebhookRepository::new(pool);

    let subscription = repo
        .create("https://example.com/hook", &["import.completed".to_string()])
        .await
        .unwrap();
    let webhook_id = subscription.id.unwrap();
    repo.create_delivery(webhook_id, "import.completed", &serde_json::json!({"job_id": "abc"}))
        .await
        .unwrap();

    repo.delete(webhook_id).await.unwrap();

    let deliveries = repo.find_deliveries_for_webhook(webhook_id, 10).await.unwrap();
    assert!(deliveries.is_empty(), "deliveries should cascade-delete with their subscription");
}
