//! Outbound webhook delivery client.
//!
//! Grounded on `infrastructure/external/tmdb/client.rs`'s `reqwest::Client`
//! construction and timeout idiom, and on the original's
//! `app/services/webhook_service.py` / `app/tasks/webhook_tasks.py` for
//! delivery semantics: POST JSON with a 10s hard timeout, truncate the
//! response body to 1000 chars, classify the outcome as success/failed.

use std::time::{Duration, Instant};

use reqwest::Client;

use crate::shared::error::WebhookError;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_BODY_CHARS: usize = 1_000;

pub struct DeliveryOutcome {
    pub success: bool,
    pub response_code: Option<i32>,
    pub response_body: Option<String>,
    pub response_time_ms: i64,
}

pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    pub fn new() -> Result<Self, WebhookError> {
        let http = Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| WebhookError::RequestFailed(e.to_string()))?;
        Ok(Self { http })
    }

    /// POSTs `payload` to `url` and classifies the outcome. Never returns
    /// `Err` for a failed delivery (timeout, transport error, non-2xx) —
    /// those are reported as a non-`success` `DeliveryOutcome` so the
    /// caller can still write a `failed` delivery row before re-raising
    /// to trigger the broker's retry policy. `Err` is reserved for
    /// misconfiguration (bad URL).
    pub async fn deliver(&self, url: &str, payload: &serde_json::Value) -> Result<DeliveryOutcome, WebhookError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(WebhookError::InvalidUrl(url.to_string()));
        }

        let started = Instant::now();
        let result = self.http.post(url).json(payload).send().await;
        let elapsed_ms = started.elapsed().as_millis() as i64;

        match result {
            Ok(response) => {
                let status = response.status();
                let body_text = response.text().await.unwrap_or_default();
                let truncated = truncate_body(&body_text);
                Ok(DeliveryOutcome {
                    success: status.is_success(),
                    response_code: Some(status.as_u16() as i32),
                    response_body: Some(truncated),
                    response_time_ms: elapsed_ms,
                })
            }
            Err(e) => {
                let message = if e.is_timeout() {
                    format!("timeout: {e}")
                } else if e.is_connect() {
                    format!("connect error: {e}")
                } else {
                    format!("transport error: {e}")
                };
                Ok(DeliveryOutcome {
                    success: false,
                    response_code: None,
                    response_body: Some(truncate_body(&message)),
                    response_time_ms: elapsed_ms,
                })
            }
        }
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new().expect("default reqwest client configuration is always valid")
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_RESPONSE_BODY_CHARS {
        body.to_string()
    } else {
        body.chars().take(MAX_RESPONSE_BODY_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn truncate_body_caps_at_1000_chars() {
        let long = "x".repeat(5_000);
        assert_eq!(truncate_body(&long).chars().count(), MAX_RESPONSE_BODY_CHARS);
    }

    #[test]
    fn truncate_body_leaves_short_body_untouched() {
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[tokio::test]
    async fn deliver_rejects_non_http_scheme() {
        let client = WebhookClient::new().unwrap();
        let err = client
            .deliver("ftp://example.com/hook", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_matches!(err, WebhookError::InvalidUrl(_));
    }

    #[tokio::test]
    async fn deliver_reports_success_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = WebhookClient::new().unwrap();
        let outcome = client
            .deliver(&format!("{}/hook", server.uri()), &serde_json::json!({"event": "import.completed"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.response_code, Some(200));
        assert_eq!(outcome.response_body.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn deliver_reports_failure_on_non_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = WebhookClient::new().unwrap();
        let outcome = client
            .deliver(&format!("{}/hook", server.uri()), &serde_json::json!({}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.response_code, Some(500));
        assert_eq!(outcome.response_body.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn deliver_truncates_oversized_response_body() {
        let server = MockServer::start().await;
        let long_body = "y".repeat(5_000);
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200).set_body_string(long_body))
            .mount(&server)
            .await;

        let client = WebhookClient::new().unwrap();
        let outcome = client
            .deliver(&format!("{}/hook", server.uri()), &serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(outcome.response_body.unwrap().chars().count(), MAX_RESPONSE_BODY_CHARS);
    }

    #[tokio::test]
    async fn deliver_reports_failure_on_unreachable_host() {
        // Nothing is listening on this port; the connection attempt fails
        // the same way a timeout would, without waiting out the 10s timeout.
        let client = WebhookClient::new().unwrap();
        let outcome = client.deliver("http://127.0.0.1:1", &serde_json::json!({})).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.response_code, None);
        assert!(outcome.response_body.is_some());
    }
}
