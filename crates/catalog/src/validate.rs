//! Declarative field validation.
//!
//! Every record kind implements [`Validate`]; repositories run it before any
//! write. A failed validation blocks the write and surfaces the complete,
//! ordered list of field violations, keyed by field path (nested fields use
//! dotted/indexed paths such as `items[0].quantity`).

use core::fmt;

use rust_decimal::Decimal;

/// A single field-level constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field path, e.g. `name` or `pricing.total`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// An ordered collection of field violations.
///
/// Accumulates every violation found rather than stopping at the first, so
/// callers can report the full set in one pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a violation for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded violations, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Merge another collection, prefixing its field paths.
    pub fn merge_prefixed(&mut self, prefix: &str, other: Self) {
        for err in other.errors {
            self.errors.push(FieldError {
                field: format!("{prefix}.{}", err.field),
                message: err.message,
            });
        }
    }

    /// Convert into a `Result`, erring when any violation was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

/// Pre-persistence constraint check for a record kind.
pub trait Validate {
    /// Check every declared constraint, accumulating all violations.
    ///
    /// # Errors
    ///
    /// Returns the full field-keyed violation list when any constraint fails.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// =============================================================================
// Checker helpers
// =============================================================================

/// Require a trimmed, non-empty string within a length range.
pub fn check_str_len(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(field, format!("{field} is required"));
    } else if len < min || len > max {
        errors.push(field, format!("must be between {min} and {max} characters"));
    }
}

/// Cap the length of an optional string.
pub fn check_opt_str_max(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value
        && value.chars().count() > max
    {
        errors.push(field, format!("cannot exceed {max} characters"));
    }
}

/// Require a non-negative decimal amount.
pub fn check_non_negative(errors: &mut ValidationErrors, field: &str, value: Decimal) {
    if value.is_sign_negative() {
        errors.push(field, "must not be negative");
    }
}

/// Require a non-negative integer quantity.
pub fn check_non_negative_i32(errors: &mut ValidationErrors, field: &str, value: i32) {
    if value < 0 {
        errors.push(field, "must not be negative");
    }
}

/// Require an integer within an inclusive range.
pub fn check_range_i32(errors: &mut ValidationErrors, field: &str, value: i32, min: i32, max: i32) {
    if value < min || value > max {
        errors.push(field, format!("must be between {min} and {max}"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_accumulates_in_order() {
        let mut errors = ValidationErrors::new();
        check_str_len(&mut errors, "name", "", 2, 100);
        check_range_i32(&mut errors, "rating", 9, 1, 5);

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.errors()[0].field, "name");
        assert_eq!(err.errors()[1].field, "rating");
    }

    #[test]
    fn test_display_lists_all_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "name is required");
        errors.push("rating", "must be between 1 and 5");
        let text = errors.to_string();
        assert!(text.contains("name: name is required"));
        assert!(text.contains("rating: must be between 1 and 5"));
    }

    #[test]
    fn test_merge_prefixed() {
        let mut inner = ValidationErrors::new();
        inner.push("quantity", "must be at least 1");

        let mut outer = ValidationErrors::new();
        outer.merge_prefixed("items[0]", inner);
        assert_eq!(outer.errors()[0].field, "items[0].quantity");
    }

    #[test]
    fn test_check_str_len_required() {
        let mut errors = ValidationErrors::new();
        check_str_len(&mut errors, "name", "   ", 2, 100);
        assert_eq!(errors.errors()[0].message, "name is required");
    }

    #[test]
    fn test_check_str_len_bounds() {
        let mut errors = ValidationErrors::new();
        check_str_len(&mut errors, "name", "a", 2, 100);
        assert!(!errors.is_empty());

        let mut errors = ValidationErrors::new();
        check_str_len(&mut errors, "name", "ab", 2, 100);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_check_non_negative() {
        let mut errors = ValidationErrors::new();
        check_non_negative(&mut errors, "price", Decimal::from(-1));
        assert!(!errors.is_empty());

        let mut errors = ValidationErrors::new();
        check_non_negative(&mut errors, "price", Decimal::ZERO);
        assert!(errors.is_empty());
    }
}
