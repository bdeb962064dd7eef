// Interface Abstraction Layer
//
// This module contains all interface definitions that establish the Dependency Inversion Principle.
// These interfaces define contracts between layers without specifying implementations.
//
// Layer Structure:
// - messaging: Interfaces for event-driven communication
// - repositories: Repository interfaces (defined in domain layer, re-exported here)

pub mod messaging;

// Re-export domain repository interfaces for convenience
pub use crate::domain::repositories::{JobRepository, ProductRepository, WebhookRepository};
