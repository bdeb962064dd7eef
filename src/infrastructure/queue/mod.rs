//! Redis-backed durable queue contract (C10).
//!
//! REDESIGN: the original system used RabbitMQ + Celery. This corpus has
//! no idiomatic Celery equivalent, so the broker is reimplemented on top
//! of Redis, already a dependency for the progress store (C1). See
//! DESIGN.md for the full rationale.

pub mod redis_queue;
pub mod work_item;

pub use redis_queue::{ClaimedWorkItem, QueueName, RedisQueue, MAX_RETRIES};
pub use work_item::WorkItem;
