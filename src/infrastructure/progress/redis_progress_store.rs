//! Redis progress store (C1).
//!
//! Two namespaces per job: a durable snapshot hash (`import_progress:hash:{id}`,
//! TTL 3600s, refreshed on every write) and a fire-and-forget pub/sub
//! channel (`import_progress:channel:{id}`). Field values are JSON-encoded
//! individually so mixed types (numbers, bools, null, strings) round-trip,
//! with a best-effort fallback to the raw string on decode failure.
//!
//! Grounded on `app/core/redis_manager.py::ProgressManager` (key layout,
//! TTL, encode/decode fallback) and
//! `examples/other_examples/..._vclip-queue-src-progress.rs.rs`'s
//! `ProgressChannel` (async multiplexed connection, `redis::pipe()` for
//! the hash write + publish, `into_on_message()` subscriber stream).

use std::collections::HashMap;

use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio_stream::Stream;
use uuid::Uuid;

use crate::shared::error::ProgressStoreError;

const NAMESPACE: &str = "import_progress";
const DEFAULT_TTL_SECONDS: i64 = 3_600;

pub struct RedisProgressStore {
    conn: ConnectionManager,
    client: redis::Client,
    ttl_seconds: i64,
}

impl RedisProgressStore {
    pub async fn connect(redis_url: &str) -> Result<Self, ProgressStoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            client,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        })
    }

    fn hash_key(job_id: Uuid) -> String {
        format!("{NAMESPACE}:hash:{job_id}")
    }

    fn channel(job_id: Uuid) -> String {
        format!("{NAMESPACE}:channel:{job_id}")
    }

    fn encode_value(value: &serde_json::Value) -> Result<String, ProgressStoreError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode_value(raw: &str) -> serde_json::Value {
        serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
    }

    /// Merges `fields` into the job's durable snapshot hash and refreshes
    /// the TTL. Each field is stored JSON-encoded.
    pub async fn put_snapshot(
        &self,
        job_id: Uuid,
        fields: &HashMap<String, serde_json::Value>,
    ) -> Result<(), ProgressStoreError> {
        let key = Self::hash_key(job_id);
        let mut encoded: Vec<(String, String)> = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            encoded.push((field.clone(), Self::encode_value(value)?));
        }

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.hset_multiple(&key, &encoded).ignore();
        pipe.expire(&key, self.ttl_seconds).ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    /// Reads the full snapshot hash for a job, decoding each field.
    /// Returns `None` if the key has expired or was never written.
    pub async fn get_snapshot(
        &self,
        job_id: Uuid,
    ) -> Result<Option<HashMap<String, serde_json::Value>>, ProgressStoreError> {
        let key = Self::hash_key(job_id);
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(&key).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        let decoded = raw
            .into_iter()
            .map(|(field, value)| (field, Self::decode_value(&value)))
            .collect();
        Ok(Some(decoded))
    }

    /// Publishes a fire-and-forget update on the job's live channel.
    /// Returns the number of subscribers that received it (0 if none
    /// were listening — the caller is expected to tolerate this, since
    /// C8 also polls the snapshot as a catch-up path).
    pub async fn publish_live(
        &self,
        job_id: Uuid,
        fields: &HashMap<String, serde_json::Value>,
    ) -> Result<i64, ProgressStoreError> {
        let payload = serde_json::to_string(fields)?;
        let mut conn = self.conn.clone();
        let n_subscribers: i64 = conn.publish(Self::channel(job_id), payload).await?;
        Ok(n_subscribers)
    }

    /// Opens a dedicated pub/sub connection subscribed to the job's live
    /// channel and returns a stream of decoded field maps. Dropping the
    /// stream unsubscribes and releases the connection.
    pub async fn subscribe(
        &self,
        job_id: Uuid,
    ) -> Result<impl Stream<Item = HashMap<String, serde_json::Value>>, ProgressStoreError> {
        let pubsub_conn = self.client.get_async_connection().await?;
        let mut pubsub = pubsub_conn.into_pubsub();
        pubsub.subscribe(Self::channel(job_id)).await?;

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let payload: String = msg.get_payload().ok()?;
            serde_json::from_str::<HashMap<String, serde_json::Value>>(&payload).ok()
        });
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_value_falls_back_to_raw_string_on_bad_json() {
        let decoded = RedisProgressStore::decode_value("not json {{{");
        assert_eq!(decoded, serde_json::Value::String("not json {{{".to_string()));
    }

    #[test]
    fn decode_value_round_trips_mixed_types() {
        for raw in ["42", "true", "null", "\"batch_3\""] {
            let decoded = RedisProgressStore::decode_value(raw);
            let reencoded = serde_json::to_string(&decoded).unwrap();
            assert_eq!(reencoded, raw);
        }
    }
}
