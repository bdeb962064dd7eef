//! Domain Services - Stateless services containing business logic
//!
//! Domain services contain business logic that doesn't naturally fit
//! within a single entity or value object.

pub mod validation_service;

pub use validation_service::{
    CsvRowError, DefaultValidationService, ValidationService, OPTIONAL_HEADERS, REQUIRED_HEADERS,
};
