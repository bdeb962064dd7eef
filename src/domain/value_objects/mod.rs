//! Value Objects - Immutable objects defined by their attributes
//!
//! Value objects are identified by their attributes rather than an identity.
//! They are immutable and have no lifecycle.

pub mod job_kind;
pub mod job_status;
pub mod progress_snapshot;

pub use job_kind::JobKind;
pub use job_status::JobStatus;
pub use progress_snapshot::ProgressSnapshot;
