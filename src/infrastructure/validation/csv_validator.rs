//! CSV pre-flight validator (C4).
//!
//! Grounded on the original `app/services/csv_validator.py`: same
//! constants (100 MB cap, first 100 data rows schema-checked, halt after
//! 10 row errors with a truncation marker), same header/row rules as
//! `domain::services::validation_service`, which this module delegates
//! the pure row-shape checks to. Parsing itself uses the `csv` crate,
//! pulled in the way the teacher reaches for a parsing crate only once a
//! concrete format needs it (e.g. NFO/XML).

use std::collections::HashMap;
use std::path::Path;

use crate::domain::services::{DefaultValidationService, ValidationService};
use crate::shared::error::ValidationError;

pub const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;
pub const SAMPLE_ROWS: usize = 100;
pub const MAX_ROW_ERRORS: usize = 10;

#[derive(Debug, Clone)]
pub struct CsvValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    pub total_rows: i64,
    pub sampled_rows: i64,
}

pub struct CsvValidator {
    rules: DefaultValidationService,
}

impl CsvValidator {
    pub fn new() -> Self {
        Self {
            rules: DefaultValidationService,
        }
    }

    pub fn validate(&self, path: &Path) -> Result<CsvValidationReport, ValidationError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(ValidationError::InvalidExtension(filename.to_string()));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| ValidationError::ParseError(format!("cannot stat file: {e}")))?;
        if metadata.len() > MAX_FILE_SIZE_BYTES {
            let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
            return Err(ValidationError::FileTooLarge(size_mb, MAX_FILE_SIZE_BYTES / (1024 * 1024)));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| ValidationError::ParseError(e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ValidationError::ParseError(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        let missing = self.rules.missing_required_headers(&headers);
        let mut errors = Vec::new();
        if !missing.is_empty() {
            return Err(ValidationError::MissingHeaders(missing.join(", ")));
        }

        for unknown in self.rules.unknown_headers(&headers) {
            errors.push(format!("Warning: unrecognized header '{unknown}'"));
        }

        let mut total_rows: i64 = 0;
        let mut truncated = false;
        let mut record = csv::StringRecord::new();
        loop {
            let has_record = reader
                .read_record(&mut record)
                .map_err(|e| ValidationError::ParseError(format!("row {}: {e}", total_rows + 1)))?;
            if !has_record {
                break;
            }
            total_rows += 1;

            if (total_rows as usize) <= SAMPLE_ROWS && !truncated {
                let row_number = total_rows as usize;
                let raw: HashMap<String, String> = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), v.trim().to_string()))
                    .collect();

                if let Err(row_errors) = self.rules.validate_row(row_number, &raw) {
                    for row_error in row_errors {
                        errors.push(format!(
                            "row {}: {} - {}",
                            row_error.row, row_error.field, row_error.message
                        ));
                        if errors.len() >= MAX_ROW_ERRORS {
                            truncated = true;
                            break;
                        }
                    }
                }
            }
        }

        if truncated {
            errors.push(format!("Validation stopped after {MAX_ROW_ERRORS} errors"));
        }

        let ok = !errors.iter().any(|e| !e.starts_with("Warning:"));
        Ok(CsvValidationReport {
            ok,
            errors,
            total_rows,
            sampled_rows: total_rows.min(SAMPLE_ROWS as i64),
        })
    }
}

impl Default for CsvValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn rejects_missing_name_header() {
        let file = write_temp_csv("sku,description\nSKU-1,a widget\n");
        let err = CsvValidator::new().validate(file.path()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingHeaders(_)));
    }

    #[test]
    fn accepts_minimal_valid_file_and_counts_rows() {
        let file = write_temp_csv("sku,name\nSKU-1,Widget\nSKU-2,Gadget\n");
        let report = CsvValidator::new().validate(file.path()).unwrap();
        assert!(report.ok);
        assert_eq!(report.total_rows, 2);
    }

    #[test]
    fn rejects_non_csv_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"sku,name\nSKU-1,Widget\n").unwrap();
        let err = CsvValidator::new().validate(file.path()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidExtension(_)));
    }

    #[test]
    fn collects_row_errors_up_to_truncation_limit() {
        let mut body = String::from("sku,name\n");
        for _ in 0..15 {
            body.push_str(",Widget\n");
        }
        let file = write_temp_csv(&body);
        let report = CsvValidator::new().validate(file.path()).unwrap();
        assert!(!report.ok);
        assert!(report.errors.iter().any(|e| e.contains("stopped after")));
    }
}
