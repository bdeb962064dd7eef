//! Outbound webhook delivery (part of C9).

pub mod webhook_client;

pub use webhook_client::{DeliveryOutcome, WebhookClient};
