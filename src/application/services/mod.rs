//! Application Services
//!
//! Application services coordinate multiple use cases and workflows.
//! They provide higher-level orchestration beyond single use cases.

pub mod progress_emitter;
pub mod webhook_publisher;

pub use progress_emitter::ProgressEmitter;
pub use webhook_publisher::WebhookPublisher;
