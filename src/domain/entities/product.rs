//! Product entity
//!
//! Represents a catalog product row, as imported from CSV.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique identifier (None for new entities, not yet persisted)
    pub id: Option<i64>,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single validated, ready-to-persist row produced by the CSV validator,
/// prior to assignment of a database identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}
