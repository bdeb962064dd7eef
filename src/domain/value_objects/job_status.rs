//! JobStatus value object
//!
//! Lifecycle states shared by ingest and bulk-delete jobs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::DomainError;

/// Lifecycle state of an ingest or bulk-delete job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Uploading,
    Parsing,
    Importing,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Uploading => "uploading",
            JobStatus::Parsing => "parsing",
            JobStatus::Importing => "importing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// True once the job has reached a terminal state and will not change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "uploading" => Ok(JobStatus::Uploading),
            "parsing" => Ok(JobStatus::Parsing),
            "importing" => Ok(JobStatus::Importing),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            other => Err(DomainError::ParseError(format!("unknown job status: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for status in [
            JobStatus::Queued,
            JobStatus::Uploading,
            JobStatus::Parsing,
            JobStatus::Importing,
            JobStatus::Done,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn only_done_and_failed_are_terminal() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Importing.is_terminal());
    }
}
