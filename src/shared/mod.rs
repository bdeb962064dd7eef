//! Shared types and utilities used across the application

pub mod config;
pub mod di;
pub mod error;

pub use config::Config;
pub use di::{DIError, DIResult, ServiceContainer, ServiceLifetime, ServiceRegistry};
pub use error::{
    ApplicationError,
    DomainError,
    JobError,
    MessagingError,
    ProgressStoreError,
    QueueError,
    RepositoryError,
    ValidationError,
    WebhookError,
};
