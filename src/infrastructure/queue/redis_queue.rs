//! Redis-backed durable queue.
//!
//! Stands in for the RabbitMQ/Celery broker the original implementation
//! used (see DESIGN.md's REDESIGN note). Each named queue is modeled as a
//! set of per-priority Redis lists (`queue:{name}:p{priority}`), popped
//! highest-priority-first, plus a single in-flight list per queue that a
//! claimed item is moved into until it is acked or nacked, and a retry
//! sorted set (`queue:{name}:retry`) scored by the next eligible attempt
//! time in unix milliseconds.
//!
//! Reliability follows `examples/other_examples/.../queue_logic.rs`'s
//! claim/ack/nack-to-DLQ vocabulary, adapted from a `SELECT ... FOR UPDATE
//! SKIP LOCKED` row claim to a Redis list move.

use rand::Rng;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::infrastructure::queue::work_item::WorkItem;
use crate::shared::error::QueueError;

/// Named queues from the queue contract, with their routing properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueName {
    Default,
    Ingest,
    BulkOps,
    Webhook,
    Dlq,
}

impl QueueName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::Default => "default",
            QueueName::Ingest => "ingest",
            QueueName::BulkOps => "bulk_ops",
            QueueName::Webhook => "webhook",
            QueueName::Dlq => "dlq",
        }
    }

    /// Key TTL, refreshed on every push; matches the contract table in
    /// the queue design (spec §4.9).
    pub fn ttl_seconds(&self) -> i64 {
        match self {
            QueueName::Default => 3_600,
            QueueName::Ingest => 7_200,
            QueueName::BulkOps => 3_600,
            QueueName::Webhook => 3_600,
            QueueName::Dlq => 7 * 24 * 3_600,
        }
    }

    /// Priority bands, highest first. A "0-10" band is ten lists polled
    /// in descending order.
    pub fn priority_bands(&self) -> std::ops::RangeInclusive<u8> {
        match self {
            QueueName::Default | QueueName::Ingest => 0..=10,
            QueueName::BulkOps | QueueName::Webhook => 0..=5,
            QueueName::Dlq => 0..=0,
        }
    }

    pub fn has_dlq(&self) -> bool {
        matches!(self, QueueName::Ingest | QueueName::BulkOps | QueueName::Webhook)
    }

    /// Backoff cap: ~10 min for ingest/delete, ~1 min for webhook.
    pub fn backoff_cap_ms(&self) -> u64 {
        match self {
            QueueName::Webhook => 60_000,
            QueueName::Dlq => 0,
            _ => 600_000,
        }
    }
}

pub const MAX_RETRIES: u32 = 3;

/// A work item popped off a priority band and moved into the in-flight
/// list. Holds the exact raw JSON that was pushed so `ack`/`nack` can
/// remove it from the in-flight list by value.
#[derive(Debug, Clone)]
pub struct ClaimedWorkItem {
    pub item: WorkItem,
    raw: String,
}

pub struct RedisQueue {
    conn: ConnectionManager,
}

impl RedisQueue {
    pub async fn connect(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }

    fn band_key(queue: QueueName, priority: u8) -> String {
        format!("queue:{}:p{}", queue.as_str(), priority)
    }

    fn inflight_key(queue: QueueName) -> String {
        format!("queue:{}:inflight", queue.as_str())
    }

    fn retry_key(queue: QueueName) -> String {
        format!("queue:{}:retry", queue.as_str())
    }

    /// Pushes a work item onto a priority band, refreshing the queue's TTL.
    pub async fn push(&self, queue: QueueName, item: &WorkItem, priority: u8) -> Result<(), QueueError> {
        let priority = priority.min(*queue.priority_bands().end());
        let key = Self::band_key(queue, priority);
        let raw = serde_json::to_string(item)?;
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.lpush(&key, &raw).ignore();
        pipe.expire(&key, queue.ttl_seconds()).ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    /// Attempts to claim one item, trying priority bands highest to
    /// lowest. Non-blocking; callers poll on a short interval when this
    /// returns `None`, mirroring a `BRPOPLPUSH` with a bounded wait.
    pub async fn claim(&self, queue: QueueName) -> Result<Option<ClaimedWorkItem>, QueueError> {
        let mut conn = self.conn.clone();
        let inflight = Self::inflight_key(queue);
        let bands: Vec<u8> = queue.priority_bands().rev().collect();
        for priority in bands {
            let key = Self::band_key(queue, priority);
            let raw: Option<String> = conn.rpoplpush(&key, &inflight).await?;
            if let Some(raw) = raw {
                let item: WorkItem = match serde_json::from_str(&raw) {
                    Ok(item) => item,
                    Err(e) => {
                        let _: () = conn.lrem(&inflight, 1, &raw).await?;
                        return Err(QueueError::from(e));
                    }
                };
                return Ok(Some(ClaimedWorkItem { item, raw }));
            }
        }
        Ok(None)
    }

    /// Acknowledges successful completion: removes the item from the
    /// in-flight list. Never acknowledge on receipt, only after the task
    /// finishes, per the worker-side policy in spec §4.9.
    pub async fn ack(&self, queue: QueueName, claimed: &ClaimedWorkItem) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let inflight = Self::inflight_key(queue);
        let _: i32 = conn.lrem(&inflight, 1, &claimed.raw).await?;
        Ok(())
    }

    /// Records a failed attempt. Below `MAX_RETRIES`, schedules a
    /// re-delivery with exponential backoff and jitter; at or beyond the
    /// limit, routes the item to the dead-letter queue.
    pub async fn nack(
        &self,
        queue: QueueName,
        claimed: ClaimedWorkItem,
        error: &str,
    ) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let inflight = Self::inflight_key(queue);
        let _: i32 = conn.lrem(&inflight, 1, &claimed.raw).await?;

        let retried = claimed.item.with_incremented_retry();

        if !queue.has_dlq() || retried.retry_count > MAX_RETRIES {
            let envelope = serde_json::json!({
                "work_item": retried,
                "source_queue": queue.as_str(),
                "error": error,
            });
            let raw = serde_json::to_string(&envelope)?;
            let key = Self::band_key(QueueName::Dlq, 0);
            let mut pipe = redis::pipe();
            pipe.lpush(&key, &raw).ignore();
            pipe.expire(&key, QueueName::Dlq.ttl_seconds()).ignore();
            pipe.query_async::<_, ()>(&mut conn).await?;
            return Err(QueueError::RetriesExhausted(retried.id.to_string()));
        }

        let delay_ms = backoff_with_jitter(retried.retry_count, queue.backoff_cap_ms());
        let next_attempt_ms = now_unix_ms() + delay_ms as i64;
        let raw = serde_json::to_string(&retried)?;
        let _: () = conn.zadd(Self::retry_key(queue), raw, next_attempt_ms).await?;
        Ok(())
    }

    /// Moves retry-set entries whose scheduled time has passed back onto
    /// their priority-0 band. Workers call this on their poll loop.
    pub async fn promote_due_retries(&self, queue: QueueName) -> Result<usize, QueueError> {
        let mut conn = self.conn.clone();
        let retry_key = Self::retry_key(queue);
        let now = now_unix_ms();
        let due: Vec<String> = conn.zrangebyscore(&retry_key, "-inf", now).await?;
        for raw in &due {
            let key = Self::band_key(queue, 0);
            let mut pipe = redis::pipe();
            pipe.lpush(&key, raw).ignore();
            pipe.expire(&key, queue.ttl_seconds()).ignore();
            pipe.zrem(&retry_key, raw).ignore();
            pipe.query_async::<_, ()>(&mut conn).await?;
        }
        Ok(due.len())
    }
}

fn now_unix_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Full-jitter exponential backoff: a random delay in `[0, min(cap, base * 2^retry)]`.
fn backoff_with_jitter(retry_count: u32, cap_ms: u64) -> u64 {
    let base_ms: u64 = 1_000;
    let exp = base_ms.saturating_mul(1u64 << retry_count.min(20));
    let capped = exp.min(cap_ms.max(base_ms));
    rand::thread_rng().gen_range(0..=capped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_never_exceeds_cap() {
        for retry in 0..6 {
            let delay = backoff_with_jitter(retry, 60_000);
            assert!(delay <= 60_000);
        }
    }

    #[test]
    fn queue_properties_match_contract_table() {
        assert_eq!(QueueName::Ingest.ttl_seconds(), 7_200);
        assert_eq!(QueueName::BulkOps.ttl_seconds(), 3_600);
        assert_eq!(QueueName::Dlq.ttl_seconds(), 7 * 24 * 3_600);
        assert!(QueueName::Ingest.has_dlq());
        assert!(!QueueName::Default.has_dlq());
        assert_eq!(*QueueName::Webhook.priority_bands().end(), 5);
        assert_eq!(*QueueName::Ingest.priority_bands().end(), 10);
    }
}
