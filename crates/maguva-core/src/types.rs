//! # Domain Types
//!
//! Core domain types used throughout the back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────┐     ┌──────────────┐            │
//! │  │   Vendor     │◄────│   Product    │◄────│  StockBatch  │            │
//! │  │  contact +   │ 0..1│  sku         │ 1   │  batch_number│            │
//! │  │  address     │     │  stock_count │     │  added / sold│            │
//! │  └──────────────┘     └──────┬───────┘     └──────┬───────┘            │
//! │                              │ 1                  │ 1                   │
//! │                       ┌──────┴────────────────────┴───┐                 │
//! │                       │        InventoryUnit          │ one row per     │
//! │                       │  size, sku, barcode           │ physical piece  │
//! │                       └───────────────────────────────┘                 │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────┐                                  │
//! │  │    Order     │◄────│  OrderItem   │  snapshot: name/sku/size/price   │
//! │  └──────────────┘     └──────────────┘  raw inventory_id / product_id   │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────────┐                              │
//! │  │ TailorOrder  │◄────│ TailorOrderItem  │                              │
//! │  │ ordered →    │     │ item, qty, notes │                              │
//! │  │ delivered    │     └──────────────────┘                              │
//! │  └──────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code (sku, barcode, order_number) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::decimal;
use crate::money::Money;
use crate::GST_RATE_BPS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1800 bps = 18% GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The single GST slab applied to POS sales.
    pub const GST: TaxRate = TaxRate(GST_RATE_BPS);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Role
// =============================================================================

/// Back-office role, derived once at authentication time.
///
/// ## Derivation
/// ```text
/// is_superuser ──► Admin
/// is_staff     ──► Staff
/// otherwise    ──► User
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    User,
}

impl Role {
    /// Derives the role from the stored account flags.
    pub fn from_flags(is_staff: bool, is_superuser: bool) -> Self {
        if is_superuser {
            Role::Admin
        } else if is_staff {
            Role::Staff
        } else {
            Role::User
        }
    }

    /// Staff and admins may manage the catalog and read analytics.
    #[inline]
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::User => "user",
        }
    }
}

// =============================================================================
// Catalog Enums
// =============================================================================

/// Garment size of a single inventory unit.
///
/// The empty string is a real value: accessories and dupattas carry no size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Size {
    #[serde(rename = "S")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "S"))]
    Small,
    #[serde(rename = "M")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "M"))]
    Medium,
    #[serde(rename = "L")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "L"))]
    Large,
    #[serde(rename = "XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "XL"))]
    ExtraLarge,
    #[serde(rename = "XXL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "XXL"))]
    DoubleExtraLarge,
    #[default]
    #[serde(rename = "")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = ""))]
    NoSize,
}

impl Size {
    /// Stored code ("S", "M", ..., "" for no size).
    pub fn code(&self) -> &'static str {
        match self {
            Size::Small => "S",
            Size::Medium => "M",
            Size::Large => "L",
            Size::ExtraLarge => "XL",
            Size::DoubleExtraLarge => "XXL",
            Size::NoSize => "",
        }
    }

    /// Code for grouped listings, where the empty size shows as `NONE`.
    pub fn display_code(&self) -> &'static str {
        match self {
            Size::NoSize => "NONE",
            other => other.code(),
        }
    }
}

/// Product categories offered by the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum ProductType {
    Kurti,
    Saree,
    Lehenga,
    Dress,
    Top,
    Bottom,
    Dupatta,
    Accessories,
    Nighty,
    Chudidar,
    Blouse,
    Other,
}

impl ProductType {
    pub const ALL: [ProductType; 12] = [
        ProductType::Kurti,
        ProductType::Saree,
        ProductType::Lehenga,
        ProductType::Dress,
        ProductType::Top,
        ProductType::Bottom,
        ProductType::Dupatta,
        ProductType::Accessories,
        ProductType::Nighty,
        ProductType::Chudidar,
        ProductType::Blouse,
        ProductType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Kurti => "Kurti",
            ProductType::Saree => "Saree",
            ProductType::Lehenga => "Lehenga",
            ProductType::Dress => "Dress",
            ProductType::Top => "Top",
            ProductType::Bottom => "Bottom",
            ProductType::Dupatta => "Dupatta",
            ProductType::Accessories => "Accessories",
            ProductType::Nighty => "Nighty",
            ProductType::Chudidar => "Chudidar",
            ProductType::Blouse => "Blouse",
            ProductType::Other => "Other",
        }
    }

    /// First three letters, upper-cased: `Nighty` → `NIG`.
    pub fn sku_prefix(&self) -> String {
        self.as_str().chars().take(3).collect::<String>().to_uppercase()
    }
}

/// Fabric of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum FabricType {
    Cotton,
    Linen,
    Silk,
    Chiffon,
    Georgette,
    Crepe,
    Polyester,
    Rayon,
    Mixed,
    Other,
}

impl FabricType {
    pub const ALL: [FabricType; 10] = [
        FabricType::Cotton,
        FabricType::Linen,
        FabricType::Silk,
        FabricType::Chiffon,
        FabricType::Georgette,
        FabricType::Crepe,
        FabricType::Polyester,
        FabricType::Rayon,
        FabricType::Mixed,
        FabricType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FabricType::Cotton => "Cotton",
            FabricType::Linen => "Linen",
            FabricType::Silk => "Silk",
            FabricType::Chiffon => "Chiffon",
            FabricType::Georgette => "Georgette",
            FabricType::Crepe => "Crepe",
            FabricType::Polyester => "Polyester",
            FabricType::Rayon => "Rayon",
            FabricType::Mixed => "Mixed",
            FabricType::Other => "Other",
        }
    }
}

/// How `markup_value` is applied on top of the base price.
///
/// ## Units
/// - `Fixed`: `markup_value` is paise (rupees on the wire)
/// - `Percent`: `markup_value` is basis points (percent on the wire, 25 = 2500)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MarkupType {
    #[default]
    Fixed,
    Percent,
}

/// Tender used at the POS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

/// Lifecycle of a tailoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TailorStatus {
    #[default]
    Ordered,
    Delivered,
}

impl TailorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TailorStatus::Ordered => "ordered",
            TailorStatus::Delivered => "delivered",
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A back-office account.
///
/// The password hash never leaves the database layer in a response.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_staff, self.is_superuser)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role(),
        }
    }
}

/// Public shape of a user returned by login and verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub role: Role,
}

// =============================================================================
// Vendor
// =============================================================================

/// A supplier of stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Vendor {
    pub id: String,
    pub vendor_name: String,
    pub contact_person_name: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A sellable design, e.g. a cotton kurti in one colour.
///
/// ## Stock Invariant
/// `stock_count` equals Σ `available_qty` over the product's batches.
/// It is only changed by single-statement increments in the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub vendor_id: Option<String>,
    /// Joined from vendors for display.
    pub vendor_name: Option<String>,
    pub product_type: ProductType,
    pub fabric_type: FabricType,
    pub sub_category: Option<String>,
    /// `#RRGGBB`
    pub color_code: String,
    #[serde(rename = "base_price", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub base_price_paise: i64,
    pub markup_type: MarkupType,
    /// Paise for fixed markup, basis points for percent markup.
    #[serde(rename = "markup_price", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub markup_value: i64,
    #[serde(rename = "mrp", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub mrp_paise: i64,
    /// 0..=10000 (0% to 100%)
    #[serde(rename = "discount_percentage", with = "decimal::percent")]
    #[ts(type = "number")]
    pub discount_bps: u32,
    pub sku: String,
    pub stock_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_paise(self.base_price_paise)
    }

    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paise(self.mrp_paise)
    }
}

// =============================================================================
// Stock Batch
// =============================================================================

/// A received lot of one product (a GRN).
///
/// ## Invariant
/// `sold_qty <= added_qty`. The schema enforces it with a CHECK and the
/// sale path guards the increment in its WHERE clause.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockBatch {
    pub id: String,
    pub product_id: String,
    pub vendor_id: Option<String>,
    /// Sequential per product, starting at 1.
    pub batch_number: i64,
    pub added_qty: i64,
    pub sold_qty: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockBatch {
    /// Units still on hand. Derived, never stored.
    #[inline]
    pub fn available_qty(&self) -> i64 {
        self.added_qty - self.sold_qty
    }
}

// =============================================================================
// Inventory Unit
// =============================================================================

/// One physical piece on the shelf. Deleted the moment it is sold.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryUnit {
    pub id: String,
    pub product_id: String,
    pub batch_id: String,
    pub size: Size,
    pub sku: String,
    pub barcode: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A completed POS sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_mobile: String,
    #[serde(rename = "subtotal", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub subtotal_paise: i64,
    #[serde(rename = "discount_total", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub discount_total_paise: i64,
    #[serde(rename = "gst_percentage", with = "decimal::percent")]
    #[ts(type = "number")]
    pub gst_rate_bps: u32,
    #[serde(rename = "gst_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub gst_paise: i64,
    #[serde(rename = "total_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_paise: i64,
    pub payment_method: PaymentMethod,
    #[serde(rename = "payment_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub payment_amount_paise: i64,
    /// User id of the cashier; null once the account is removed.
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

/// A line of an order.
///
/// ## Snapshot Pattern
/// Name, SKU, size and price are copied at sale time. `inventory_id` and
/// `product_id` are plain values, not foreign keys: the unit row is gone
/// after the sale and the product may be deleted later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Product type at time of sale (frozen).
    pub product_name: String,
    /// Unit SKU at time of sale (frozen).
    pub sku: String,
    /// Size code at time of sale (frozen).
    pub size: String,
    #[serde(rename = "price", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub price_paise: i64,
    #[serde(rename = "discount_percentage", with = "decimal::percent")]
    #[ts(type = "number")]
    pub discount_bps: u32,
    /// Discount per unit.
    #[serde(rename = "discount_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub discount_paise: i64,
    pub quantity: i64,
    #[serde(rename = "line_total", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub line_total_paise: i64,
    pub inventory_id: String,
    pub product_id: String,
    pub batch_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An order together with its lines and the cashier's email.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub created_by_email: Option<String>,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Tailoring
// =============================================================================

/// A bespoke stitching order.
///
/// ## Invariant
/// `balance_paise = total_paise - advance_paise`, recomputed on every write.
/// JSON carries them as `total_amount`, `advance_paid` and `balance_amount`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TailorOrder {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_mobile: String,
    pub product_name: String,
    pub description: String,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub delivery_date: NaiveDate,
    #[serde(rename = "total_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_paise: i64,
    #[serde(rename = "advance_paid", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub advance_paise: i64,
    #[serde(rename = "balance_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub balance_paise: i64,
    pub status: TailorStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl TailorOrder {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }

    #[inline]
    pub fn advance(&self) -> Money {
        Money::from_paise(self.advance_paise)
    }
}

/// One garment line of a tailoring order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TailorOrderItem {
    pub id: String,
    pub tailor_order_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub remarks: Option<String>,
}

/// A tailoring order with its item details.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TailorOrderWithItems {
    #[serde(flatten)]
    pub order: TailorOrder,
    pub item_details: Vec<TailorOrderItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_derivation() {
        assert_eq!(Role::from_flags(true, true), Role::Admin);
        assert_eq!(Role::from_flags(false, true), Role::Admin);
        assert_eq!(Role::from_flags(true, false), Role::Staff);
        assert_eq!(Role::from_flags(false, false), Role::User);
        assert!(Role::Staff.is_elevated());
        assert!(!Role::User.is_elevated());
    }

    #[test]
    fn test_size_codes() {
        assert_eq!(Size::Medium.code(), "M");
        assert_eq!(Size::NoSize.code(), "");
        assert_eq!(Size::NoSize.display_code(), "NONE");
        assert_eq!(Size::DoubleExtraLarge.display_code(), "XXL");

        let parsed: Size = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, Size::NoSize);
        let parsed: Size = serde_json::from_str("\"XL\"").unwrap();
        assert_eq!(parsed, Size::ExtraLarge);
    }

    #[test]
    fn test_sku_prefix() {
        assert_eq!(ProductType::Nighty.sku_prefix(), "NIG");
        assert_eq!(ProductType::Top.sku_prefix(), "TOP");
        assert_eq!(ProductType::Accessories.sku_prefix(), "ACC");
    }

    #[test]
    fn test_gst_rate() {
        assert_eq!(TaxRate::GST.bps(), 1_800);
        assert!((TaxRate::GST.percentage() - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Upi).unwrap(), "\"upi\"");
        assert_eq!(serde_json::to_string(&TailorStatus::Delivered).unwrap(), "\"delivered\"");
        assert_eq!(serde_json::to_string(&MarkupType::Percent).unwrap(), "\"percent\"");
        assert_eq!(serde_json::to_string(&ProductType::Chudidar).unwrap(), "\"Chudidar\"");
    }

    #[test]
    fn test_tailor_order_amounts_are_rupees() {
        let now = Utc::now();
        let order = TailorOrder {
            id: "t1".to_string(),
            order_number: "TL-00001".to_string(),
            customer_name: "Anitha".to_string(),
            customer_mobile: "09876543210".to_string(),
            product_name: "Blouse".to_string(),
            description: String::new(),
            order_date: now,
            delivery_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            total_paise: 150_000,
            advance_paise: 50_000,
            balance_paise: 100_000,
            status: TailorStatus::Ordered,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["total_amount"], 1500.0);
        assert_eq!(json["advance_paid"], 500.0);
        assert_eq!(json["balance_amount"], 1000.0);
        assert!(json.get("total_paise").is_none());

        let back: TailorOrder = serde_json::from_value(json).unwrap();
        assert_eq!(back.balance_paise, 100_000);
    }
}
