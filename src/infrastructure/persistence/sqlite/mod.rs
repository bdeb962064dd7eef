// SQLite Repository Implementations
//
// This module contains SQLite-based implementations of the repository interfaces.

pub mod job_repository;
pub mod product_repository;
pub mod webhook_repository;

pub use job_repository::SqliteJobRepository;
pub use product_repository::SqliteProductRepository;
pub use webhook_repository::SqliteWebhookRepository;
