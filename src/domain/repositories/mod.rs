//! Repository Interfaces - Abstractions for data access
//!
//! Repository interfaces define the contract for data access implementations.
//! They use domain entities and return domain errors.

pub mod job_repository;
pub mod product_repository;
pub mod webhook_repository;

pub use job_repository::JobRepository;
pub use product_repository::ProductRepository;
pub use webhook_repository::WebhookRepository;
