//! # Validation Module
//!
//! Field-level validation rules for the back-office.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum Json / Query)                          │
//! │  └── Shape and type errors (400 before any handler runs)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Request `validate()` methods                                 │
//! │  └── THIS MODULE: business rules per field                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (sku, barcode, order_number)                   │
//! │  ├── CHECK constraints (sold_qty <= added_qty, stock_count >= 0)       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_PAISE, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and its maximum length.
///
/// ## Example
/// ```rust
/// use maguva_core::validation::validate_required;
///
/// assert!(validate_required("vendor_name", "Lakshmi Textiles", 255).is_ok());
/// assert!(validate_required("vendor_name", "   ", 255).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_max_len(field, value, max)
}

/// Validates only the maximum length (empty is allowed).
pub fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Required, at most 254 characters
/// - Exactly one `@` with a non-empty local part and a dotted domain
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    validate_required(field, email, 254)?;

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a `#RRGGBB` colour code.
///
/// ## Example
/// ```rust
/// use maguva_core::validation::validate_color_code;
///
/// assert!(validate_color_code("#FF5733").is_ok());
/// assert!(validate_color_code("FF5733").is_err());
/// assert!(validate_color_code("#GG0000").is_err());
/// ```
pub fn validate_color_code(color: &str) -> ValidationResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "color_code".to_string(),
            reason: "must look like #RRGGBB".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone/mobile number: digits with an optional leading `+`.
pub fn validate_phone(field: &str, phone: &str, required: bool) -> ValidationResult<()> {
    let phone = phone.trim();
    if phone.is_empty() {
        if required {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }
        return Ok(());
    }

    validate_max_len(field, phone, 15)?;

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a money amount that may be zero.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_AMOUNT_PAISE (₹99,999,999.99)
pub fn validate_non_negative_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    validate_amount_ceiling(field, paise)
}

/// Validates a money amount that must be above zero.
pub fn validate_positive_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    validate_amount_ceiling(field, paise)
}

fn validate_amount_ceiling(field: &str, paise: i64) -> ValidationResult<()> {
    if paise > MAX_AMOUNT_PAISE {
        return Err(ValidationError::too_large(field));
    }

    Ok(())
}

/// Validates a percentage held in basis points (0% to 100%).
pub fn validate_percentage_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates the dashboard look-back window in days.
pub fn validate_days(days: i64) -> ValidationResult<()> {
    if !(1..=3650).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 1,
            max: 3650,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier & Date Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use maguva_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("city", "Hyderabad", 100).is_ok());
        assert!(validate_required("city", "", 100).is_err());
        assert!(validate_required("city", &"A".repeat(101), 100).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "owner@maguva.in").is_ok());
        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "owner.maguva.in").is_err());
        assert!(validate_email("email", "@maguva.in").is_err());
        assert!(validate_email("email", "owner@maguva").is_err());
        assert!(validate_email("email", "ow ner@maguva.in").is_err());
    }

    #[test]
    fn test_validate_color_code() {
        assert!(validate_color_code("#a1B2c3").is_ok());
        assert!(validate_color_code("#FFF").is_err());
        assert!(validate_color_code("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("phone", "9876543210", true).is_ok());
        assert!(validate_phone("phone", "+919876543210", true).is_ok());
        assert!(validate_phone("phone", "", false).is_ok());
        assert!(validate_phone("phone", "", true).is_err());
        assert!(validate_phone("phone", "98765-43210", true).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_paise_bounds() {
        assert!(validate_non_negative_paise("price", 0).is_ok());
        assert!(validate_non_negative_paise("price", MAX_AMOUNT_PAISE).is_ok());
        assert!(validate_non_negative_paise("price", -1).is_err());
        assert!(matches!(
            validate_non_negative_paise("price", i64::MAX),
            Err(ValidationError::AmountTooLarge { .. })
        ));
        assert!(validate_positive_paise("amount", 0).is_err());
        assert!(validate_positive_paise("amount", MAX_AMOUNT_PAISE + 1).is_err());
    }

    #[test]
    fn test_validate_percentage_bps() {
        assert!(validate_percentage_bps("discount", 0).is_ok());
        assert!(validate_percentage_bps("discount", 10_000).is_ok());
        assert!(validate_percentage_bps("discount", 10_001).is_err());
    }

    #[test]
    fn test_validate_days() {
        assert!(validate_days(30).is_ok());
        assert!(validate_days(0).is_err());
        assert!(validate_days(3651).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date", "2025-03-09").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
        assert!(parse_date("date", "09-03-2025").is_err());
    }
}
