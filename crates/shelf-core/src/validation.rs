//! # Validation Module
//!
//! Barcode format rules.
//!
//! A decoder will happily report QR payloads, partial reads and Code-128
//! text. Only retail product codes are worth a catalog round-trip:
//!
//! | Symbology | Digits |
//! |-----------|--------|
//! | EAN-8     | 8      |
//! | UPC-A     | 12     |
//! | EAN-13    | 13     |
//!
//! Surrounding whitespace is trimmed first. Check digits are not verified.

use crate::error::ValidationError;
use crate::VALID_BARCODE_LENGTHS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates decoded text and returns the trimmed barcode.
///
/// ## Example
/// ```rust
/// use shelf_core::validation::validate_barcode;
///
/// assert_eq!(validate_barcode(" 4005808521175\n").unwrap(), "4005808521175");
/// assert!(validate_barcode("https://example.com").is_err());
/// ```
pub fn validate_barcode(raw: &str) -> ValidationResult<&str> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotNumeric {
            value: trimmed.to_string(),
        });
    }

    if !VALID_BARCODE_LENGTHS.contains(&trimmed.len()) {
        return Err(ValidationError::InvalidLength {
            length: trimmed.len(),
            allowed: &VALID_BARCODE_LENGTHS,
        });
    }

    Ok(trimmed)
}

/// Boolean form of [`validate_barcode`].
pub fn is_valid_barcode_format(raw: &str) -> bool {
    validate_barcode(raw).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
