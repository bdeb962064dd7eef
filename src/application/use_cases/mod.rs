pub mod create_bulk_delete_job;
pub mod create_ingest_job;
pub mod stream_progress;

pub use create_bulk_delete_job::CreateBulkDeleteJobUseCase;
pub use create_ingest_job::CreateIngestJobUseCase;
pub use stream_progress::StreamProgressUseCase;
