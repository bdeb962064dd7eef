//! Presentation Layer
//!
//! HTTP adapters: route handlers, request/response DTOs, and middleware.

pub mod http;
