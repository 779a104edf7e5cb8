//! # Sale Pricing
//!
//! Computes the totals of a POS sale from its lines.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each line:                                                         │
//! │    gross     = price × qty                                              │
//! │    discount  = round(price × discount% × qty)                           │
//! │    line_total = gross − discount                                        │
//! │                                                                         │
//! │  subtotal       = Σ gross                                               │
//! │  discount_total = Σ discount                                            │
//! │  taxable        = subtotal − discount_total                             │
//! │  gst            = round(taxable × 18%)                                  │
//! │  total          = taxable + gst                                         │
//! │                                                                         │
//! │  All rounding is half-up to the paisa.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{MarkupType, TaxRate};
use crate::validation::{validate_non_negative_paise, validate_percentage_bps, validate_quantity};
use crate::MAX_SALE_LINES;

/// One priced line of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLine {
    /// Unit price charged at the counter.
    pub price: Money,
    pub quantity: i64,
    /// Discount in basis points (1000 = 10%).
    pub discount_bps: u32,
}

/// Per-line amounts, in the same order as the input lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineTotals {
    /// Discount on a single unit.
    pub unit_discount: Money,
    /// Discount on the whole line.
    pub line_discount: Money,
    /// Line amount after discount, before GST.
    pub line_total: Money,
}

/// Totals of a whole sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount_total: Money,
    pub taxable: Money,
    pub gst_rate: TaxRate,
    pub gst: Money,
    pub total: Money,
    pub lines: Vec<LineTotals>,
}

/// Prices a sale at the standard GST rate.
///
/// ## Errors
/// - No lines, or more than `MAX_SALE_LINES`
/// - Quantity outside 1..=999
/// - Negative price, or a price above `MAX_AMOUNT_PAISE`
/// - Discount above 100%
pub fn price_sale(lines: &[SaleLine]) -> CoreResult<SaleTotals> {
    price_sale_at(lines, TaxRate::GST)
}

/// Prices a sale at an explicit tax rate.
pub fn price_sale_at(lines: &[SaleLine], gst_rate: TaxRate) -> CoreResult<SaleTotals> {
    if lines.is_empty() {
        return Err(ValidationError::Empty {
            item: "item".to_string(),
        }
        .into());
    }

    if lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        }
        .into());
    }

    let mut subtotal = Money::zero();
    let mut discount_total = Money::zero();
    let mut line_totals = Vec::with_capacity(lines.len());

    for line in lines {
        validate_quantity(line.quantity)?;
        validate_non_negative_paise("price", line.price.paise())?;
        validate_percentage_bps("discount", line.discount_bps)?;

        let gross = line
            .price
            .checked_mul_quantity(line.quantity)
            .ok_or_else(|| ValidationError::too_large("price"))?;
        let line_discount = gross.percentage(line.discount_bps);

        subtotal = subtotal
            .checked_add(gross)
            .ok_or_else(|| ValidationError::too_large("subtotal"))?;
        discount_total += line_discount;
        line_totals.push(LineTotals {
            unit_discount: line.price.percentage(line.discount_bps),
            line_discount,
            line_total: gross - line_discount,
        });
    }

    let taxable = subtotal - discount_total;
    let gst = taxable.calculate_tax(gst_rate);
    let total = taxable
        .checked_add(gst)
        .ok_or_else(|| ValidationError::too_large("total_amount"))?;

    Ok(SaleTotals {
        subtotal,
        discount_total,
        taxable,
        gst_rate,
        gst,
        total,
        lines: line_totals,
    })
}

// =============================================================================
// Product Pricing
// =============================================================================

/// Derives the MRP from the base price and markup.
///
/// ## Rules
/// - Fixed: `base + markup_value` (paise)
/// - Percent: `base × (1 + markup_value / 10000)`, rounded half-up
///
/// ## Example
/// ```rust
/// use maguva_core::money::Money;
/// use maguva_core::pricing::derive_mrp;
/// use maguva_core::types::MarkupType;
///
/// let base = Money::from_paise(50_000); // ₹500
/// assert_eq!(derive_mrp(base, MarkupType::Fixed, 15_000).paise(), 65_000);
/// assert_eq!(derive_mrp(base, MarkupType::Percent, 2_500).paise(), 62_500);
/// ```
pub fn derive_mrp(base: Money, markup_type: MarkupType, markup_value: i64) -> Money {
    match markup_type {
        MarkupType::Fixed => base + Money::from_paise(markup_value),
        MarkupType::Percent => {
            let bps = u32::try_from(markup_value.max(0)).unwrap_or(u32::MAX);
            base + base.percentage(bps)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn line(price: i64, quantity: i64, discount_bps: u32) -> SaleLine {
        SaleLine {
            price: Money::from_paise(price),
            quantity,
            discount_bps,
        }
    }

    #[test]
    fn test_two_units_ten_percent_off() {
        let totals = price_sale(&[line(100_000, 2, 1_000)]).unwrap();

        assert_eq!(totals.subtotal.paise(), 200_000);
        assert_eq!(totals.discount_total.paise(), 20_000);
        assert_eq!(totals.taxable.paise(), 180_000);
        assert_eq!(totals.gst.paise(), 32_400);
        assert_eq!(totals.total.paise(), 212_400);

        assert_eq!(totals.lines[0].unit_discount.paise(), 10_000);
        assert_eq!(totals.lines[0].line_total.paise(), 180_000);
    }

    #[test]
    fn test_total_identity_holds_across_lines() {
        let totals = price_sale(&[
            line(49_999, 3, 1_250),
            line(1_099, 1, 0),
            line(250_000, 2, 3_333),
        ])
        .unwrap();

        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount_total + totals.gst
        );
        assert_eq!(
            totals.gst,
            (totals.subtotal - totals.discount_total).calculate_tax(TaxRate::GST)
        );
        let lines_sum: Money = totals.lines.iter().map(|l| l.line_total).sum();
        assert_eq!(lines_sum, totals.taxable);
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert!(matches!(price_sale(&[]), Err(CoreError::Validation(_))));
        assert!(price_sale(&[line(1_000, 0, 0)]).is_err());
        assert!(price_sale(&[line(-1, 1, 0)]).is_err());
        assert!(price_sale(&[line(1_000, 1, 10_001)]).is_err());
    }

    #[test]
    fn test_huge_prices_are_rejected_not_overflowed() {
        let err = price_sale(&[line(i64::MAX / 2, 3, 0)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::AmountTooLarge { .. })
        ));

        // Largest allowed price at the largest quantity still prices cleanly
        let totals = price_sale(&[line(crate::MAX_AMOUNT_PAISE, crate::MAX_ITEM_QUANTITY, 0)]).unwrap();
        assert_eq!(
            totals.subtotal.paise(),
            crate::MAX_AMOUNT_PAISE * crate::MAX_ITEM_QUANTITY
        );
    }

    #[test]
    fn test_full_discount_is_free() {
        let totals = price_sale(&[line(75_000, 1, 10_000)]).unwrap();
        assert!(totals.total.is_zero());
        assert!(totals.gst.is_zero());
    }

    #[test]
    fn test_derive_mrp_percent_rounds() {
        // ₹333.33 + 10% = ₹366.663 → ₹366.66
        let mrp = derive_mrp(Money::from_paise(33_333), MarkupType::Percent, 1_000);
        assert_eq!(mrp.paise(), 36_666);
    }
}
