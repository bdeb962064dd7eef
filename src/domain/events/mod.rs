//! Domain Events - Events that occur within the domain
//!
//! Domain events represent significant occurrences that other parts of the
//! application may need to react to.

pub mod job_events;

pub use job_events::{JobCompletedEvent, JobFailedEvent};
