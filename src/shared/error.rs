//! Shared error types for the application
//!
//! This module defines all error types used across the application,
//! following domain-driven design principles.

use thiserror::Error;

/// Domain errors - errors that occur in the domain layer
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Repository errors - errors that occur during data access
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if db_err.is_check_violation() {
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Database(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut => {
                RepositoryError::Connection("Connection pool timeout".to_string())
            }
            sqlx::Error::PoolClosed => {
                RepositoryError::Connection("Connection pool closed".to_string())
            }
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Messaging/Event bus errors
#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Handler error: {0}")]
    HandlerError(String),

    #[error("Handler timeout: {0}")]
    HandlerTimeout(String),

    #[error("No subscribers for event: {0}")]
    NoSubscribers(String),

    #[error("Event bus error: {0}")]
    EventBusError(String),
}

impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        MessagingError::Serialization(err.to_string())
    }
}

/// Queue errors - errors that occur pushing, claiming, or acking work items
/// on the Redis-backed durable queue.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Work item not claimed: {0}")]
    NotClaimed(String),

    #[error("Retries exhausted for work item: {0}")]
    RetriesExhausted(String),
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::Serialization(err.to_string())
    }
}

/// Progress store errors - errors reading or writing the Redis snapshot
/// hash / pub-sub channel backing a job's progress stream.
#[derive(Debug, Clone, Error)]
pub enum ProgressStoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Snapshot not found: {0}")]
    NotFound(String),
}

impl From<redis::RedisError> for ProgressStoreError {
    fn from(err: redis::RedisError) -> Self {
        ProgressStoreError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for ProgressStoreError {
    fn from(err: serde_json::Error) -> Self {
        ProgressStoreError::Serialization(err.to_string())
    }
}

/// Webhook delivery errors.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Invalid subscription URL: {0}")]
    InvalidUrl(String),

    #[error("Delivery request failed: {0}")]
    RequestFailed(String),

    #[error("Delivery timed out after {0}ms")]
    Timeout(u64),
}

/// CSV / row validation errors for catalog import.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Missing required headers: {0}")]
    MissingHeaders(String),

    #[error("CSV file is empty or has no headers")]
    EmptyFile,

    #[error("File size ({0:.2} MB) exceeds maximum allowed size ({1} MB)")]
    FileTooLarge(f64, u64),

    #[error("Invalid file extension: {0}. Expected .csv")]
    InvalidExtension(String),

    #[error("CSV parsing error: {0}")]
    ParseError(String),

    #[error("Validation stopped after {0} errors")]
    TooManyErrors(usize),
}

/// Job lifecycle errors (import / bulk-delete jobs).
#[derive(Debug, Clone, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already in a terminal state: {0}")]
    AlreadyTerminal(String),

    #[error("Invalid status transition: {0} -> {1}")]
    InvalidTransition(String, String),
}

/// Application errors - errors that occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Progress store error: {0}")]
    ProgressStore(#[from] ProgressStoreError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
