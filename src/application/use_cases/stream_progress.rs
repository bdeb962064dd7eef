//! Stream Progress Use Case
//!
//! Produces the event sequence behind the job progress SSE endpoint.
//! Grounded on `application/use_cases/stream_media.rs`'s shape of a use
//! case wrapping a repository plus an adapter behind a typed result, and
//! on the original's `app/api/progress.py` generator for the exact merge
//! of live pub/sub messages with a snapshot-poll fallback.

use std::time::{Duration, Instant};

use async_stream::stream;
use futures::{Stream, StreamExt};
use tokio::time::timeout;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::JobStatus;
use crate::infrastructure::progress::RedisProgressStore;
use crate::shared::error::{ApplicationError, JobError};

use std::sync::Arc;

const LIVE_WAIT: Duration = Duration::from_secs(1);
const SNAPSHOT_POLL_INTERVAL: Duration = Duration::from_millis(2_500);

/// One item emitted on the progress stream. The presentation layer maps
/// each variant to its SSE framing (`data: ...`, a `:`-prefixed comment,
/// or the final synthetic `close` event).
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Payload(serde_json::Value),
    KeepAlive,
    Close,
}

pub struct StreamProgressUseCase {
    job_repository: Arc<dyn JobRepository>,
    progress_store: Arc<RedisProgressStore>,
}

impl StreamProgressUseCase {
    pub fn new(job_repository: Arc<dyn JobRepository>, progress_store: Arc<RedisProgressStore>) -> Self {
        Self { job_repository, progress_store }
    }

    /// Builds the event stream for a job. Fails fast if the job doesn't
    /// exist; everything after that point is best-effort per §4.7 — the
    /// stream itself never errors once it starts.
    #[instrument(skip(self))]
    pub async fn stream(&self, job_id: Uuid) -> Result<impl Stream<Item = ProgressEvent>, ApplicationError> {
        let job = self
            .job_repository
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| ApplicationError::Job(JobError::NotFound(job_id.to_string())))?;

        let mut live = self.progress_store.subscribe(job_id).await?;

        let initial = match self.progress_store.get_snapshot(job_id).await? {
            Some(fields) => serde_json::Value::Object(fields.into_iter().collect()),
            None => synthesize_initial_event(job.status, job.processed_rows, job.total_rows),
        };

        let progress_store = self.progress_store.clone();

        let events = stream! {
            let initial_terminal = event_is_terminal(&initial);
            yield ProgressEvent::Payload(initial.clone());
            if initial_terminal {
                yield ProgressEvent::Close;
                return;
            }

            let mut last_poll = Instant::now();
            loop {
                match timeout(LIVE_WAIT, live.next()).await {
                    Ok(Some(fields)) => {
                        let event = serde_json::Value::Object(fields.into_iter().collect());
                        let terminal = event_is_terminal(&event);
                        yield ProgressEvent::Payload(event);
                        last_poll = Instant::now();
                        if terminal {
                            yield ProgressEvent::Close;
                            return;
                        }
                    }
                    Ok(None) => {
                        // the publisher side dropped the channel; nothing more will arrive.
                        return;
                    }
                    Err(_elapsed) => {
                        if last_poll.elapsed() >= SNAPSHOT_POLL_INTERVAL {
                            last_poll = Instant::now();
                            if let Ok(Some(fields)) = progress_store.get_snapshot(job_id).await {
                                let event = serde_json::Value::Object(fields.into_iter().collect());
                                let terminal = event_is_terminal(&event);
                                yield ProgressEvent::Payload(event);
                                if terminal {
                                    yield ProgressEvent::Close;
                                    return;
                                }
                                continue;
                            }
                        }
                        yield ProgressEvent::KeepAlive;
                    }
                }
            }
        };

        Ok(events)
    }
}

fn synthesize_initial_event(status: JobStatus, processed_rows: i64, total_rows: Option<i64>) -> serde_json::Value {
    serde_json::json!({
        "status": status.as_str(),
        "processed_rows": processed_rows,
        "total_rows": total_rows,
        "progress": 0.0,
    })
}

fn event_is_terminal(event: &serde_json::Value) -> bool {
    event
        .get("status")
        .and_then(|v| v.as_str())
        .map(|s| matches!(s, "done" | "failed"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_event_reflects_known_job_fields() {
        let event = synthesize_initial_event(JobStatus::Queued, 0, Some(100));
        assert_eq!(event["status"], "queued");
        assert_eq!(event["processed_rows"], 0);
        assert_eq!(event["total_rows"], 100);
        assert_eq!(event["progress"], 0.0);
    }

    #[test]
    fn terminal_statuses_are_recognized() {
        assert!(event_is_terminal(&serde_json::json!({"status": "done"})));
        assert!(event_is_terminal(&serde_json::json!({"status": "failed"})));
        assert!(!event_is_terminal(&serde_json::json!({"status": "importing"})));
    }

    #[test]
    fn missing_status_field_is_not_terminal() {
        assert!(!event_is_terminal(&serde_json::json!({"processed_rows": 5})));
    }
}
