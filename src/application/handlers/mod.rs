//! Event Handlers
//!
//! Event handlers react to domain events and trigger side effects.
//! They provide loose coupling through the event bus.

pub mod job_completed_handler;

pub use job_completed_handler::JobCompletedHandler;
