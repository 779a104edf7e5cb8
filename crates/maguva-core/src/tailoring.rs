//! # Tailoring Order State Machine
//!
//! Rules for bespoke stitching orders.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   create (advance ≤ total, ≥ 1 item)                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────┐   update fields / items        ┌──────────┐              │
//! │   │ ordered  │ ◄───────────────────────┐      │          │              │
//! │   │          │ ────────────────────────┘      │delivered │ (terminal)   │
//! │   │          │                                │          │              │
//! │   │          │ ── record_payment(exact) ────► │          │              │
//! │   └──────────┘                                └──────────┘              │
//! │        │                                           │                    │
//! │        ▼                                           ▼                    │
//! │   delete allowed                         every change rejected         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Rule
//! The balance is settled in one go on delivery. A payment must be positive,
//! must not exceed the balance, and must clear it exactly. The data model
//! keeps `advance_paid` so a future policy could accept instalments.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::TailorStatus;
use crate::validation::validate_non_negative_paise;

/// Outcome of an accepted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub advance: Money,
    pub balance: Money,
    pub status: TailorStatus,
}

/// Balance still owed on an order.
#[inline]
pub fn balance(total: Money, advance: Money) -> Money {
    total - advance
}

/// Checks the amounts of a new or edited order.
pub fn validate_amounts(total: Money, advance: Money) -> CoreResult<()> {
    validate_non_negative_paise("total_amount", total.paise())?;
    validate_non_negative_paise("advance_paid", advance.paise())?;

    if advance > total {
        return Err(CoreError::AdvanceExceedsTotal { advance, total });
    }

    Ok(())
}

/// Checks that an order carries at least one item detail.
pub fn validate_item_count(count: usize) -> CoreResult<()> {
    if count == 0 {
        return Err(ValidationError::Empty {
            item: "item detail".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Fails unless the order is still open for changes.
pub fn ensure_editable(order_number: &str, status: TailorStatus) -> CoreResult<()> {
    match status {
        TailorStatus::Ordered => Ok(()),
        TailorStatus::Delivered => Err(CoreError::OrderFrozen {
            order_number: order_number.to_string(),
            status: status.as_str().to_string(),
        }),
    }
}

/// Applies a payment under the pay-in-full rule.
///
/// ## Flow
/// ```text
/// amount ≤ 0                      → MustBePositive
/// amount > total − advance        → Overpayment
/// amount ≠ total − advance        → PartialPayment { remaining }
/// amount = total − advance        → balance 0, status delivered
/// ```
///
/// ## Example
/// ```rust
/// use maguva_core::money::Money;
/// use maguva_core::tailoring::apply_payment;
/// use maguva_core::types::TailorStatus;
///
/// let outcome = apply_payment(
///     "AB12CD34",
///     TailorStatus::Ordered,
///     Money::from_rupees(1500),
///     Money::from_rupees(500),
///     Money::from_rupees(1000),
/// )
/// .unwrap();
/// assert_eq!(outcome.status, TailorStatus::Delivered);
/// assert!(outcome.balance.is_zero());
/// ```
pub fn apply_payment(
    order_number: &str,
    status: TailorStatus,
    total: Money,
    advance: Money,
    amount: Money,
) -> CoreResult<PaymentOutcome> {
    ensure_editable(order_number, status)?;

    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    let remaining = total
        .checked_sub(advance)
        .ok_or_else(|| ValidationError::too_large("balance_amount"))?;

    if amount > remaining {
        return Err(CoreError::Overpayment { amount, remaining });
    }

    if amount != remaining {
        return Err(CoreError::PartialPayment { amount, remaining });
    }

    Ok(PaymentOutcome {
        advance: total,
        balance: Money::zero(),
        status: TailorStatus::Delivered,
    })
}

/// Strips leading zeros from a customer mobile number.
///
/// ## Example
/// ```rust
/// use maguva_core::tailoring::normalize_mobile;
///
/// assert_eq!(normalize_mobile(" 09876543210 "), "9876543210");
/// ```
pub fn normalize_mobile(mobile: &str) -> String {
    mobile.trim().trim_start_matches('0').to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
