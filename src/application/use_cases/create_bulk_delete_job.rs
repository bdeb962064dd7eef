//! Create Bulk-Delete Job Use Case
//!
//! Same job/queue shape as `CreateIngestJobUseCase` but with no filename
//! requirement and no source file to validate, per the original's
//! `app/services/import_service.py::ImportService.create_bulk_delete_job`.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::entities::Job;
use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobKind;
use crate::infrastructure::queue::redis_queue::{QueueName, RedisQueue};
use crate::infrastructure::queue::work_item::WorkItem;
use crate::shared::error::ApplicationError;

pub struct CreateBulkDeleteJobUseCase {
    job_repository: Arc<dyn JobRepository>,
    queue: Arc<RedisQueue>,
}

impl CreateBulkDeleteJobUseCase {
    pub fn new(job_repository: Arc<dyn JobRepository>, queue: Arc<RedisQueue>) -> Self {
        Self { job_repository, queue }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<Job, ApplicationError> {
        let job = Job::new_queued(String::new(), JobKind::BulkDelete);
        self.job_repository.create(&job).await?;

        let item = WorkItem::new(job.id, "bulk_delete", serde_json::json!({}));
        self.queue.push(QueueName::BulkOps, &item, 0).await?;

        info!(job_id = %job.id, "bulk-delete job queued");
        Ok(job)
    }
}
