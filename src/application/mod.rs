//! Application Layer
//!
//! This layer contains use cases, application services, and event handlers.
//! It orchestrates business logic and coordinates between domain and infrastructure layers.
//!
//! ## Structure
//! - **Use Cases**: Encapsulate application-specific business logic
//! - **Application Services**: Coordinate multiple use cases and workflows
//! - **Event Handlers**: React to domain events and trigger side effects

pub mod use_cases;
pub mod services;
pub mod handlers;

pub use use_cases::create_bulk_delete_job::CreateBulkDeleteJobUseCase;
pub use use_cases::create_ingest_job::CreateIngestJobUseCase;
pub use use_cases::stream_progress::StreamProgressUseCase;

pub use services::progress_emitter::ProgressEmitter;
pub use services::webhook_publisher::WebhookPublisher;

pub use handlers::job_completed_handler::JobCompletedHandler;
