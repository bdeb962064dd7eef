//! JobRepository trait
//!
//! Repository interface for job record data access.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Job;
use crate::domain::value_objects::{JobKind, JobStatus};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Inserts a new job row.
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    /// Finds a job by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;

    /// Transitions a job's status, optionally setting total/processed rows
    /// and/or an error message in the same statement.
    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        total_rows: Option<i64>,
        processed_rows: Option<i64>,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Atomically bumps `processed_rows` by `delta` (used by batch loops
    /// that don't need to touch status on every batch).
    async fn increment_processed_rows(&self, id: Uuid, delta: i64) -> Result<(), RepositoryError>;

    /// Lists the most recently created jobs, optionally filtered by kind.
    async fn find_recent(&self, kind: Option<JobKind>, limit: usize) -> Result<Vec<Job>, RepositoryError>;
}
