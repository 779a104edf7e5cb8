//! # Error Types
//!
//! Domain-specific error types for maguva-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  maguva-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  maguva-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures (wraps CoreError)            │
//! │                                                                         │
//! │  backoffice-api errors                                                 │
//! │  └── ApiError         - What the front-end sees: {"error": "..."}      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant maps to a 400 response except the validation wrapper,
/// which also maps to 400 but carries the field-level detail.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough units left in a stock batch.
    ///
    /// ## When This Occurs
    /// - Two sales race for the last unit of a batch
    /// - The batch counters were corrected by hand below the units on hand
    ///
    /// ## User Workflow
    /// ```text
    /// POS scans unit (qty: 1)
    ///      │
    ///      ▼
    /// batch: added=5, sold=5
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "KUR-1234-M-FF5733-a1b2c3", available: 0, requested: 1 }
    ///      │
    ///      ▼
    /// Whole sale is rolled back
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A sale line names an inventory unit that belongs to another product.
    #[error("Inventory unit {inventory_id} does not belong to product {product_id}")]
    ProductMismatch {
        inventory_id: String,
        product_id: String,
    },

    /// Tailoring order is delivered and can no longer change.
    ///
    /// ## When This Occurs
    /// - Editing fields or items of a delivered order
    /// - Deleting a delivered order or one of its items
    /// - Recording a second payment
    #[error("Tailor order {order_number} is {status} and cannot be modified")]
    OrderFrozen {
        order_number: String,
        status: String,
    },

    /// Advance payment larger than the order total.
    #[error("Advance cannot be greater than total amount")]
    AdvanceExceedsTotal { advance: Money, total: Money },

    /// Payment would push the advance above the order total.
    #[error("Total payments cannot exceed order amount")]
    Overpayment { amount: Money, remaining: Money },

    /// Payment does not clear the balance exactly.
    ///
    /// ## Business Rule
    /// Tailoring balances are paid in full on delivery. Partial payments
    /// are refused and the remaining balance is reported back.
    #[error("Remaining balance must be paid in full ({remaining})")]
    PartialPayment { amount: Money, remaining: Money },

    /// A field check failed.
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the field checks in [`crate::validation`] before anything
/// touches the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Missing, or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// Longer than the column allows.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Outside an inclusive numeric range (quantities, bps, `days`).
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Bad email, colour code, uuid or `YYYY-MM-DD` date.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection must not be empty.
    #[error("At least one {item} is required")]
    Empty { item: String },

    /// Request mixes values that must agree (e.g. two products in one receipt).
    #[error("{field} must be the same on every line")]
    Inconsistent { field: String },

    /// An amount, or a total built from it, is past `MAX_AMOUNT_PAISE`.
    #[error("{field} is too large")]
    AmountTooLarge { field: String },
}

impl ValidationError {
    pub fn too_large(field: &str) -> Self {
        ValidationError::AmountTooLarge {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "KUR-1234".to_string(),
            available: 0,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for KUR-1234: available 0, requested 2"
        );

        let err = CoreError::PartialPayment {
            amount: Money::from_paise(10_000),
            remaining: Money::from_paise(50_000),
        };
        assert_eq!(
            err.to_string(),
            "Remaining balance must be paid in full (₹500.00)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "vendor_name".to_string(),
        };
        assert_eq!(err.to_string(), "vendor_name is required");

        let err = ValidationError::Empty {
            item: "item detail".to_string(),
        };
        assert_eq!(err.to_string(), "At least one item detail is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "email is required");
    }
}
