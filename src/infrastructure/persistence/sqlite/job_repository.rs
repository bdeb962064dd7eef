//! SQLite Job Repository Implementation
//!
//! Grounded on `media_repository.rs`'s sqlx query/bind/map_row style.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entities::Job;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::{JobKind, JobStatus};
use crate::shared::error::RepositoryError;

pub struct SqliteJobRepository {
    pool: Pool<Sqlite>,
}

impl SqliteJobRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn map_row(row: sqlx::sqlite::SqliteRow) -> Result<Job, RepositoryError> {
        let id: String = row.try_get("id")?;
        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;
        Ok(Job {
            id: Uuid::from_str(&id).map_err(|e| RepositoryError::Deserialization(e.to_string()))?,
            filename: row.try_get("filename")?,
            kind: JobKind::from_str(&kind).map_err(|e| RepositoryError::Deserialization(e.to_string()))?,
            status: JobStatus::from_str(&status).map_err(|e| RepositoryError::Deserialization(e.to_string()))?,
            total_rows: row.try_get("total_rows")?,
            processed_rows: row.try_get("processed_rows")?,
            error_message: row.try_get("error_message")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO jobs (id, filename, kind, status, total_rows, processed_rows, error_message, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.id.to_string())
        .bind(&job.filename)
        .bind(job.kind.as_str())
        .bind(job.status.as_str())
        .bind(job.total_rows)
        .bind(job.processed_rows)
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let result = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match result {
            Some(row) => Ok(Some(Self::map_row(row)?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        total_rows: Option<i64>,
        processed_rows: Option<i64>,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        // A job that has already reached a terminal state must never be
        // mutated again (status or processed_rows), so the guard excludes
        // rows already `done`/`failed` from the match entirely.
        sqlx::query(
            "UPDATE jobs SET
                status = ?,
                total_rows = COALESCE(?, total_rows),
                processed_rows = COALESCE(?, processed_rows),
                error_message = COALESCE(?, error_message),
                updated_at = ?
             WHERE id = ? AND status NOT IN ('done', 'failed')",
        )
        .bind(status.as_str())
        .bind(total_rows)
        .bind(processed_rows)
        .bind(error_message)
        .bind(chrono::Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_processed_rows(&self, id: Uuid, delta: i64) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE jobs SET processed_rows = processed_rows + ?, updated_at = ? WHERE id = ?",
        )
        .bind(delta)
        .bind(chrono::Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_recent(&self, kind: Option<JobKind>, limit: usize) -> Result<Vec<Job>, RepositoryError> {
        let rows = match kind {
            Some(k) => {
                sqlx::query("SELECT * FROM jobs WHERE kind = ? ORDER BY created_at DESC LIMIT ?")
                    .bind(k.as_str())
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC LIMIT ?")
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut jobs = Vec::with_capacity(rows.len());
        for row in rows {
            jobs.push(Self::map_row(row)?);
        }
        Ok(jobs)
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
    async fn create_and_find_round_trips() {
        let pool = test_pool().await;
        let repo = SqliteJobRepository::new(pool);
        let job = Job::new_queued("catalog.csv".to_string(), JobKind::Import);

        repo.create(&job).await.unwrap();
        let found = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(found.filename, "catalog.csv");
        assert_eq!(found.status, JobStatus::Queued);
        assert_eq!(found.processed_rows, 0);
    }

    #[tokio::test]
    async fn increment_processed_rows_is_additive() {
        let pool = test_pool().await;
        let repo = SqliteJobRepository::new(pool);
        let job = Job::new_queued("catalog.csv".to_string(), JobKind::Import);
        repo.create(&job).await.unwrap();

        repo.increment_processed_rows(job.id, 10_000).await.unwrap();
        repo.increment_processed_rows(job.id, 5_000).await.unwrap();

        let found = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(found.processed_rows, 15_000);
    }

    #[tokio::test]
    async fn update_status_preserves_unspecified_fields() {
        let pool = test_pool().await;
        let repo = SqliteJobRepository::new(pool);
        let job = Job::new_queued("catalog.csv".to_string(), JobKind::Import);
        repo.create(&job).await.unwrap();

        repo.update_status(job.id, JobStatus::Parsing, Some(100), None, None)
            .await
            .unwrap();
        let found = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(found.status, JobStatus::Parsing);
        assert_eq!(found.total_rows, Some(100));
        assert_eq!(found.processed_rows, 0);
    }

    #[tokio::test]
    async fn update_status_is_a_no_op_once_terminal() {
        let pool = test_pool().await;
        let repo = SqliteJobRepository::new(pool);
        let job = Job::new_queued("catalog.csv".to_string(), JobKind::Import);
        repo.create(&job).await.unwrap();

        repo.update_status(job.id, JobStatus::Done, Some(100), Some(100), None)
            .await
            .unwrap();

        repo.update_status(job.id, JobStatus::Failed, None, Some(0), Some("late failure"))
            .await
            .unwrap();

        let found = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(found.status, JobStatus::Done);
        assert_eq!(found.processed_rows, 100);
        assert_eq!(found.error_message, None);
    }
}
