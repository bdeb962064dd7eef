//! Input validator (C4): CSV pre-flight shape and row-sample checks.

pub mod csv_validator;

pub use csv_validator::{CsvValidationReport, CsvValidator, MAX_FILE_SIZE_BYTES, MAX_ROW_ERRORS, SAMPLE_ROWS};
