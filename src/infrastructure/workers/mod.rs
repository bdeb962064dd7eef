//! Background worker loops (C6/C7/C9), each a pool of `tokio::spawn`
//! tasks pulling from a named queue (C10), following `main.rs`'s
//! background-scanner `tokio::spawn` loop pattern, generalized to
//! `WORKER_CONCURRENCY` tasks per queue.

pub mod bulk_delete_worker;
pub mod ingest_worker;
pub mod webhook_delivery_worker;

pub use bulk_delete_worker::BulkDeleteWorker;
pub use ingest_worker::IngestWorker;
pub use webhook_delivery_worker::WebhookDeliveryWorker;
