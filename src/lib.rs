//! catalogd library
//!
//! Catalog importer service backend. Exposes core modules for integration tests and the binaries.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod shared;

