//! Create Ingest Job Use Case
//!
//! Records a CSV upload as a queued job and hands it to the ingest worker
//! pool. Grounded on `application/use_cases/scan_library.rs`'s shape
//! (constructor takes repositories/adapters behind `Arc`, a single
//! `execute()` entry point) and the original's
//! `app/services/import_service.py::ImportService.create_import_job`.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::entities::Job;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobKind;
use crate::infrastructure::queue::redis_queue::{QueueName, RedisQueue};
use crate::infrastructure::queue::work_item::WorkItem;
use crate::shared::error::ApplicationError;

pub struct CreateIngestJobUseCase {
    job_repository: Arc<dyn JobRepository>,
    queue: Arc<RedisQueue>,
}

impl CreateIngestJobUseCase {
    pub fn new(job_repository: Arc<dyn JobRepository>, queue: Arc<RedisQueue>) -> Self {
        Self { job_repository, queue }
    }

    /// Creates the job row in `queued` and enqueues a work item carrying
    /// the already-validated file's path. The caller is expected to have
    /// run the file through the input validator first and pass its
    /// `total_rows` estimate through; the file must still exist on disk.
    #[instrument(skip(self))]
    pub async fn execute(&self, filename: String, file_path: &Path, total_rows: Option<i64>) -> Result<Job, ApplicationError> {
        require_file_exists(file_path)?;

        let mut job = Job::new_queued(filename, JobKind::Import);
        job.total_rows = total_rows;
        self.job_repository.create(&job).await?;

        let payload = serde_json::json!({ "file_path": file_path.to_string_lossy() });
        let item = WorkItem::new(job.id, "ingest", payload);
        self.queue.push(QueueName::Ingest, &item, 0).await?;

        info!(job_id = %job.id, "ingest job queued");
        Ok(job)
    }
}

fn require_file_exists(file_path: &Path) -> Result<(), ApplicationError> {
    if !file_path.exists() {
        return Err(ApplicationError::Validation(crate::shared::error::ValidationError::ParseError(format!(
            "upload file not found at {}",
            file_path.display()
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_file_exists_rejects_a_missing_path() {
        let missing = Path::new("/nonexistent/path/does-not-exist.csv");
        let err = require_file_exists(missing).unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[test]
    fn require_file_exists_accepts_the_current_file() {
        assert!(require_file_exists(Path::new(file!())).is_ok());
    }
}
