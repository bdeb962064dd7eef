//! CORS Middleware
//!
//! Configures Cross-Origin Resource Sharing.

use tower_http::cors::{AllowOrigin, CorsLayer};
use axum::http::{header, Method};
use std::time::Duration;

/// Creates a permissive CORS layer: any origin may call the API, since
/// consumers (dashboards, scripts, other services) aren't known in advance.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|_, _| true))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
