//! ValidationService trait
//!
//! Pure, IO-free validation rules for a single CSV row destined for the
//! product catalog. The infrastructure-level CSV validator drives the
//! parsing (headers, row sampling, file-size checks) and calls into this
//! service for the per-row schema checks, mirroring how the original
//! `CSVValidator._validate_sample_rows` delegated to a Pydantic schema.

use std::collections::HashMap;

use crate::domain::entities::ProductRow;

/// A single field-level validation failure for one CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRowError {
    /// 1-indexed row number within the file (header row is not counted).
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl CsvRowError {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Required and optional CSV column names for catalog import.
pub const REQUIRED_HEADERS: &[&str] = &["sku", "name"];
pub const OPTIONAL_HEADERS: &[&str] = &["description", "active"];

/// Service validating individual CSV rows against the product schema.
pub trait ValidationService: Send + Sync {
    /// Checks that `headers` contains every entry of `REQUIRED_HEADERS`.
    /// Returns the missing headers, sorted, if any are absent.
    fn missing_required_headers(&self, headers: &[String]) -> Vec<String>;

    /// Headers present that are neither required nor optional. Callers
    /// treat these as warnings, not failures.
    fn unknown_headers(&self, headers: &[String]) -> Vec<String>;

    /// Validates and converts a single raw CSV row into a `ProductRow`.
    /// `row_number` is 1-indexed and used only for error reporting.
    fn validate_row(
        &self,
        row_number: usize,
        raw: &HashMap<String, String>,
    ) -> Result<ProductRow, Vec<CsvRowError>>;
}

/// Default implementation of `ValidationService`.
pub struct DefaultValidationService;

impl ValidationService for DefaultValidationService {
    fn missing_required_headers(&self, headers: &[String]) -> Vec<String> {
        let present: std::collections::HashSet<&str> =
            headers.iter().map(|h| h.as_str()).collect();
        let mut missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .filter(|h| !present.contains(*h))
            .map(|h| h.to_string())
            .collect();
        missing.sort();
        missing
    }

    fn unknown_headers(&self, headers: &[String]) -> Vec<String> {
        let allowed: std::collections::HashSet<&str> = REQUIRED_HEADERS
            .iter()
            .chain(OPTIONAL_HEADERS.iter())
            .copied()
            .collect();
        let mut unknown: Vec<String> = headers
            .iter()
            .filter(|h| !allowed.contains(h.as_str()))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }

    fn validate_row(
        &self,
        row_number: usize,
        raw: &HashMap<String, String>,
    ) -> Result<ProductRow, Vec<CsvRowError>> {
        let mut errors = Vec::new();

        let sku = raw.get("sku").map(|s| s.trim()).unwrap_or("");
        if sku.is_empty() {
            errors.push(CsvRowError::new(
                row_number,
                "sku",
                "Value cannot be empty for CSV row validation",
            ));
        }

        let name = raw.get("name").map(|s| s.trim()).unwrap_or("");
        if name.is_empty() {
            errors.push(CsvRowError::new(
                row_number,
                "name",
                "Value cannot be empty for CSV row validation",
            ));
        }

        let description = raw
            .get("description")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let active = match raw.get("active") {
            None => true,
            Some(value) => match parse_bool(value) {
                Ok(b) => b,
                Err(_) => {
                    errors.push(CsvRowError::new(
                        row_number,
                        "active",
                        format!("Cannot parse '{}' as boolean", value),
                    ));
                    true
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProductRow {
            sku: sku.to_string(),
            name: name.to_string(),
            description,
            active,
        })
    }
}

/// Parses the accepted CSV boolean tokens, case-insensitively.
///
/// Accepts `true, yes, 1, t, y` as `true` and `false, no, 0, f, n` as
/// `false`; anything else is an error.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "t" | "y" => Ok(true),
        "false" | "no" | "0" | "f" | "n" => Ok(false),
        other => Err(format!("Cannot parse '{}' as boolean", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_required_headers_reports_sorted_missing() {
        let service = DefaultValidationService;
        let headers = vec!["description".to_string()];
        assert_eq!(
            service.missing_required_headers(&headers),
            vec!["name".to_string(), "sku".to_string()]
        );
    }

    #[test]
    fn unknown_headers_ignores_required_and_optional() {
        let service = DefaultValidationService;
        let headers = vec![
            "sku".to_string(),
            "name".to_string(),
            "active".to_string(),
            "warehouse".to_string(),
        ];
        assert_eq!(service.unknown_headers(&headers), vec!["warehouse".to_string()]);
    }

    #[test]
    fn validate_row_accepts_minimal_row_defaulting_active_true() {
        let service = DefaultValidationService;
        let raw = row(&[("sku", "ABC-1"), ("name", "Widget")]);
        let parsed = service.validate_row(1, &raw).unwrap();
        assert_eq!(parsed.sku, "ABC-1");
        assert!(parsed.active);
        assert!(parsed.description.is_none());
    }

    #[test]
    fn validate_row_rejects_empty_sku_and_name() {
        let service = DefaultValidationService;
        let raw = row(&[("sku", ""), ("name", "")]);
        let errors = service.validate_row(7, &raw).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.row == 7));
    }

    #[test]
    fn validate_row_rejects_unparseable_active() {
        let service = DefaultValidationService;
        let raw = row(&[("sku", "ABC-1"), ("name", "Widget"), ("active", "maybe")]);
        let errors = service.validate_row(2, &raw).unwrap_err();
        assert_eq!(errors[0].field, "active");
    }

    #[test]
    fn parse_bool_accepts_known_tokens_case_insensitively() {
        assert_eq!(parse_bool("Yes"), Ok(true));
        assert_eq!(parse_bool("N"), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }
}
