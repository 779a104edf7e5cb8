//! # maguva-core: Pure Business Logic for the Maguva Back-Office
//!
//! Everything the back-office decides without touching storage lives here:
//! money arithmetic, sale pricing with GST, the tailoring order state
//! machine, analytics maths and business-code generation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Maguva Back-Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Back-office front-end                        │   │
//! │  │   Catalog ──► Stock-in ──► POS ──► Tailoring ──► Dashboard      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    backoffice-api (axum)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ maguva-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐  │   │
//! │  │  │  types  │ │ pricing │ │tailoring │ │analytics │ │ codes  │  │   │
//! │  │  │ Product │ │ GST 18% │ │ ordered→ │ │ growth % │ │ SKU    │  │   │
//! │  │  │ Order   │ │ discount│ │ delivered│ │ windows  │ │ barcode│  │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └──────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    maguva-db (Database Layer)                   │   │
//! │  │        SQLite repositories, stock ledger, aggregation SQL       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and enums (Product, StockBatch, Order, ...)
//! - [`requests`] - Validated input shapes for every mutating operation
//! - [`reports`] - Read-side payloads (dashboard, vendor analytics, daily report)
//! - [`money`] - Money type with integer arithmetic (paise, no floats)
//! - [`decimal`] - JSON codecs: rupees and percentages on the wire, paise and bps inside
//! - [`pricing`] - Sale totals: subtotal, discount, GST, total
//! - [`tailoring`] - Tailoring order state machine and payment rule
//! - [`analytics`] - Growth percentages, time windows, month buckets
//! - [`codes`] - SKU, barcode and order-number generators
//! - [`validation`] - Field-level validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use maguva_core::pricing::{price_sale, SaleLine};
//! use maguva_core::money::Money;
//!
//! // Two units at ₹1000 with 10% off
//! let totals = price_sale(&[SaleLine {
//!     price: Money::from_paise(100_000),
//!     quantity: 2,
//!     discount_bps: 1_000,
//! }])
//! .unwrap();
//!
//! assert_eq!(totals.discount_total.paise(), 20_000);
//! assert_eq!(totals.gst.paise(), 32_400);
//! assert_eq!(totals.total.paise(), 212_400); // ₹2124.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod codes;
pub mod decimal;
pub mod error;
pub mod money;
pub mod pricing;
pub mod reports;
pub mod requests;
pub mod tailoring;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// GST applied to every POS sale, in basis points (18%).
///
/// ## Business Reason
/// The shop sells under a single tax slab. There are no alternate regimes.
pub const GST_RATE_BPS: u32 = 1_800;

/// Maximum quantity of a single line (sale or stock receipt).
///
/// ## Business Reason
/// Prevents accidental over-entry (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum lines in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Largest amount a single price, payment or order total may carry:
/// ₹99,999,999.99, the widest value of a `DECIMAL(10, 2)` column.
///
/// With quantities capped at `MAX_ITEM_QUANTITY` and lines at
/// `MAX_SALE_LINES`, every sale total stays far inside `i64`.
pub const MAX_AMOUNT_PAISE: i64 = 9_999_999_999;

/// Dashboard "low stock" list threshold (inclusive).
pub const DASHBOARD_LOW_STOCK_THRESHOLD: i64 = 10;

/// Low stock threshold for the dashboard counters and the daily report.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Batches older than this many days count as aged stock in the daily report.
pub const OLD_STOCK_DAYS: i64 = 180;

/// Length of a POS order number.
pub const ORDER_NUMBER_LEN: usize = 10;

/// Length of a tailoring order number.
pub const TAILOR_ORDER_NUMBER_LEN: usize = 8;
