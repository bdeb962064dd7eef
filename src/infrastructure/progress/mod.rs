//! Progress store (C1): durable snapshot hash + live pub/sub channel.

pub mod redis_progress_store;

pub use redis_progress_store::RedisProgressStore;
