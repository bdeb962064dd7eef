//! Shared progress-emission service for the ingest and bulk-delete workers.
//!
//! Grounded on `application/services/collection_manager.rs`'s shape (an
//! application service wrapping repositories/adapters behind a small
//! public API) and on the original's `ProgressTracker` /
//! `BulkDeleteProgressTracker`, merged into one generic emitter since both
//! only differ in field names — the bulk-delete tracker already reused the
//! import tracker's field names "for consistency".
//!
//! Advances the job row (C2) and writes the progress snapshot (C1) as one
//! call so every caller keeps the two views adjacent, per SPEC_FULL.md
//! §4.1/§9. Row-by-row publishes are rate-limited to ~1 per 2s per job;
//! batch boundaries must pass `force=true`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::repositories::JobRepository;
use crate::domain::value_objects::{JobStatus, ProgressSnapshot};
use crate::infrastructure::progress::RedisProgressStore;
use crate::shared::error::ApplicationError;

const MIN_PUBLISH_INTERVAL: Duration = Duration::from_secs(2);

struct EmitRateLimiter {
    last_emit: Mutex<HashMap<Uuid, Instant>>,
}

impl EmitRateLimiter {
    fn new() -> Self {
        Self { last_emit: Mutex::new(HashMap::new()) }
    }

    /// Returns true if a publish should happen now, recording the attempt
    /// when it does. `force` always publishes and resets the window.
    async fn should_emit(&self, job_id: Uuid, force: bool) -> bool {
        let mut map = self.last_emit.lock().await;
        if !force {
            if let Some(last) = map.get(&job_id) {
                if last.elapsed() < MIN_PUBLISH_INTERVAL {
                    return false;
                }
            }
        }
        map.insert(job_id, Instant::now());
        true
    }

    async fn forget(&self, job_id: Uuid) {
        self.last_emit.lock().await.remove(&job_id);
    }
}

pub struct ProgressEmitter {
    job_repository: Arc<dyn JobRepository>,
    progress_store: Arc<RedisProgressStore>,
    rate_limiter: EmitRateLimiter,
}

impl ProgressEmitter {
    pub fn new(job_repository: Arc<dyn JobRepository>, progress_store: Arc<RedisProgressStore>) -> Self {
        Self {
            job_repository,
            progress_store,
            rate_limiter: EmitRateLimiter::new(),
        }
    }

    /// Advances the job row and, subject to the rate limit (bypassed when
    /// `force` is set), writes the progress snapshot and publishes it on
    /// the live channel.
    #[allow(clippy::too_many_arguments)]
    pub async fn emit(
        &self,
        job_id: Uuid,
        status: JobStatus,
        processed_rows: i64,
        total_rows: i64,
        stage: Option<&str>,
        error_message: Option<&str>,
        force: bool,
    ) -> Result<(), ApplicationError> {
        self.job_repository
            .update_status(
                job_id,
                status,
                if total_rows > 0 { Some(total_rows) } else { None },
                Some(processed_rows),
                error_message,
            )
            .await?;

        if !self.rate_limiter.should_emit(job_id, force).await {
            return Ok(());
        }

        let mut snapshot = ProgressSnapshot::new(status, processed_rows, total_rows, unix_timestamp());
        if let Some(stage) = stage {
            snapshot = snapshot.with_stage(stage);
        }
        if let Some(error) = error_message {
            snapshot = snapshot.with_error(error);
        }

        let fields = snapshot_to_fields(&snapshot)?;
        self.progress_store.put_snapshot(job_id, &fields).await?;
        self.progress_store.publish_live(job_id, &fields).await?;
        Ok(())
    }

    /// Drops rate-limit bookkeeping for a job once it reaches a terminal
    /// state, so a future job id reusing the same bucket (unlikely given
    /// UUIDs, but cheap to guard) starts fresh.
    pub async fn forget(&self, job_id: Uuid) {
        self.rate_limiter.forget(job_id).await;
    }
}

fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

fn snapshot_to_fields(snapshot: &ProgressSnapshot) -> Result<HashMap<String, serde_json::Value>, ApplicationError> {
    let value = serde_json::to_value(snapshot).map_err(|e| ApplicationError::Internal(e.to_string()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(ApplicationError::Internal("progress snapshot did not serialize to an object".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_to_fields_includes_core_keys() {
        let snapshot = ProgressSnapshot::new(JobStatus::Importing, 10, 100, 123.0);
        let fields = snapshot_to_fields(&snapshot).unwrap();
        assert_eq!(fields.get("status").unwrap(), "importing");
        assert_eq!(fields.get("processed_rows").unwrap(), 10);
        assert_eq!(fields.get("total_rows").unwrap(), 100);
    }

    #[tokio::test]
    async fn rate_limiter_suppresses_rapid_non_forced_emits() {
        let limiter = EmitRateLimiter::new();
        let job_id = Uuid::new_v4();

        assert!(limiter.should_emit(job_id, false).await, "first emit always proceeds");
        assert!(!limiter.should_emit(job_id, false).await, "second emit within window is suppressed");
    }

    #[tokio::test]
    async fn forced_emit_always_proceeds_and_resets_window() {
        let limiter = EmitRateLimiter::new();
        let job_id = Uuid::new_v4();

        assert!(limiter.should_emit(job_id, false).await);
        assert!(limiter.should_emit(job_id, true).await, "force bypasses the rate limit");
    }

    #[tokio::test]
    async fn emit_proceeds_again_once_window_elapses() {
        let limiter = EmitRateLimiter::new();
        let job_id = Uuid::new_v4();
        limiter.last_emit.lock().await.insert(job_id, Instant::now() - Duration::from_secs(3));

        assert!(limiter.should_emit(job_id, false).await, "past the window, a non-forced emit proceeds");
    }

    #[tokio::test]
    async fn forget_clears_bookkeeping_for_a_job() {
        let limiter = EmitRateLimiter::new();
        let job_id = Uuid::new_v4();
        limiter.should_emit(job_id, true).await;
        limiter.forget(job_id).await;

        assert!(!limiter.last_emit.lock().await.contains_key(&job_id));
    }
}
