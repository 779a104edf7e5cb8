//! # Read-Side Payloads
//!
//! Shapes returned by the catalog views, the dashboard, vendor analytics
//! and the daily report. Amounts are paise in Rust and rupee decimals in
//! JSON; growth and margin percentages are floats rounded to two decimals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::decimal;
use crate::types::{InventoryUnit, PaymentMethod, Product, StockBatch, Vendor};

// =============================================================================
// Catalog Views
// =============================================================================

/// `{value, label}` pair for dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn same(value: &str) -> Self {
        ChoiceOption {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// Dropdown metadata for the add-product form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductFeatures {
    pub vendors: Vec<Vendor>,
    pub product_types: Vec<ChoiceOption>,
    pub fabric_types: Vec<ChoiceOption>,
}

/// Product entry of the inventory product dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductSelectItem {
    pub id: String,
    pub product_type: String,
    pub vendor_name: Option<String>,
}

/// Product summary inside an inventory group.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupProduct {
    pub id: String,
    pub product_type: String,
    pub vendor_name: Option<String>,
}

/// Units on hand grouped by product and size.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryGroup {
    pub product: GroupProduct,
    /// Size code, `NONE` for unsized units.
    pub size: String,
    pub quantity: i64,
}

/// A product with every unit currently on the shelf.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInventory {
    pub product: Product,
    pub vendor: Option<Vendor>,
    pub inventory: Vec<InventoryUnit>,
}

/// Result of a barcode or SKU lookup.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryLookup {
    pub inventory: InventoryUnit,
    pub product: Product,
}

/// Stock batch as shown in the batch picker.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockBatchView {
    #[serde(flatten)]
    pub batch: StockBatch,
    /// `Unit N`
    pub label: String,
    pub product_name: String,
    pub vendor_name: Option<String>,
    pub available_qty: i64,
}

impl StockBatchView {
    pub fn new(batch: StockBatch, product_name: String, vendor_name: Option<String>) -> Self {
        StockBatchView {
            label: format!("Unit {}", batch.batch_number),
            available_qty: batch.available_qty(),
            product_name,
            vendor_name,
            batch,
        }
    }
}

/// Outcome of a stock receipt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReceiptResult {
    pub batch_id: String,
    pub batch_number: i64,
    pub total_quantity: i64,
    pub items: Vec<InventoryUnit>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KeyMetrics {
    #[serde(rename = "total_revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_revenue_paise: i64,
    pub total_orders: i64,
    pub total_products: i64,
    /// Σ base_price × stock_count.
    #[serde(rename = "total_inventory_value", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_inventory_value_paise: i64,
    pub revenue_growth: f64,
    pub orders_growth: f64,
    #[serde(rename = "avg_order_value", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub avg_order_value_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyRevenue {
    /// `Mar 2025`
    pub month: String,
    #[serde(rename = "revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub revenue_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyOrders {
    pub month: String,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentOrder {
    pub id: String,
    pub order_number: String,
    /// `Walk-in Customer` when blank.
    pub customer_name: String,
    pub customer_mobile: String,
    #[serde(rename = "total_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_amount_paise: i64,
    pub payment_method: PaymentMethod,
    pub items_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Revenue per product type.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub product_type: String,
    #[serde(rename = "revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub revenue_paise: i64,
    pub quantity_sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockProduct {
    pub id: String,
    /// `Kurti - Cotton`
    pub product_name: String,
    pub sku: String,
    pub stock_count: i64,
    /// `No Vendor` when unassigned.
    pub vendor_name: String,
    #[serde(rename = "base_price", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub base_price_paise: i64,
    pub color_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentStat {
    pub method: PaymentMethod,
    pub count: i64,
    #[serde(rename = "revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub revenue_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VendorPerformance {
    pub vendor_id: String,
    pub vendor_name: String,
    #[serde(rename = "total_revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_revenue_paise: i64,
    pub product_count: i64,
    pub order_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockCounts {
    /// Products with fewer than 5 units.
    pub low_stock: i64,
    pub out_of_stock: i64,
}

/// Look-back window the dashboard was computed for.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardPeriod {
    pub days: i64,
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

/// Full dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardAnalytics {
    pub period: DashboardPeriod,
    pub key_metrics: KeyMetrics,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub monthly_orders: Vec<MonthlyOrders>,
    pub recent_orders: Vec<RecentOrder>,
    pub top_products: Vec<TopProduct>,
    pub low_stock_products: Vec<LowStockProduct>,
    pub payment_methods: Vec<PaymentStat>,
    pub vendor_performance: Vec<VendorPerformance>,
    /// Units sold in the current window.
    pub items_sold: i64,
    pub products: StockCounts,
    pub new_products_this_month: i64,
}

// =============================================================================
// Vendor Analytics
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopBatch {
    pub batch_id: String,
    pub batch_number: i64,
    pub sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopVendorProduct {
    pub product_id: String,
    pub product_type: String,
    pub sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchStock {
    pub id: String,
    pub batch_number: i64,
    pub added_qty: i64,
    pub sold_qty: i64,
    pub available_qty: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductStockDetail {
    pub product_id: String,
    pub product_type: String,
    pub total_added: i64,
    pub total_sold: i64,
    pub total_available: i64,
    /// Ordered by batch number.
    pub batches: Vec<BatchStock>,
}

/// Stock and sales of one vendor's products, month to date.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VendorAnalytics {
    pub vendor_id: String,
    pub vendor_name: String,
    pub total_products: i64,
    /// Units available across every batch.
    pub total_stock: i64,
    pub month_sold_stock: i64,
    pub top_batches_this_month: Vec<TopBatch>,
    pub top_products_this_month: Vec<TopVendorProduct>,
    pub product_stock_details: Vec<ProductStockDetail>,
}

// =============================================================================
// Daily Report
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyKpis {
    #[serde(rename = "net_revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub net_revenue_paise: i64,
    /// Σ base_price × quantity of the day's lines.
    #[serde(rename = "cogs", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub cogs_paise: i64,
    #[serde(rename = "gross_profit", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub gross_profit_paise: i64,
    pub gm_percent: f64,
    #[serde(rename = "gst", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub gst_paise: i64,
    pub bills: i64,
    pub units: i64,
    #[serde(rename = "aov", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub aov_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyOrder {
    pub id: String,
    pub order_number: String,
    #[serde(rename = "total_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_amount_paise: i64,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryRevenue {
    pub category: String,
    #[serde(rename = "revenue", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub revenue_paise: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentSplit {
    pub payment_method: PaymentMethod,
    #[serde(rename = "total", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_paise: i64,
}

/// Units received per vendor on the report day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VendorReceipt {
    /// `No Vendor` for unassigned batches.
    pub vendor_name: String,
    pub total_qty: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAnalysis {
    pub low_stock: i64,
    pub out_of_stock: i64,
    pub old_stock_batches: i64,
}

/// A batch received on the report day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LotTrace {
    pub product_id: String,
    pub product_name: String,
    pub batch_no: i64,
    pub qty: i64,
}

/// End-of-day report for one regional calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    #[ts(as = "String")]
    pub report_date: NaiveDate,
    pub kpis: DailyKpis,
    pub orders_today: Vec<DailyOrder>,
    pub category_revenue: Vec<CategoryRevenue>,
    pub payment_split: Vec<PaymentSplit>,
    pub vendor_instock: Vec<VendorReceipt>,
    pub stock_analysis: StockAnalysis,
    pub lot_trace: Vec<LotTrace>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    #[test]
    fn test_stock_batch_view_label() {
        let batch = StockBatch {
            id: "b1".to_string(),
            product_id: "p1".to_string(),
            vendor_id: None,
            batch_number: 3,
            added_qty: 10,
            sold_qty: 4,
            created_at: Utc::now(),
        };
        let view = StockBatchView::new(batch, "Saree".to_string(), None);
        assert_eq!(view.label, "Unit 3");
        assert_eq!(view.available_qty, 6);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["batch_number"], 3);
        assert_eq!(json["label"], "Unit 3");
    }

    #[test]
    fn test_amounts_render_as_rupees() {
        let kpis = DailyKpis {
            net_revenue_paise: 212_400,
            cogs_paise: 120_000,
            gross_profit_paise: 60_000,
            gm_percent: 33.33,
            gst_paise: 32_400,
            bills: 1,
            units: 2,
            aov_paise: 212_400,
        };
        let json = serde_json::to_value(&kpis).unwrap();
        assert_eq!(json["net_revenue"], 2124.0);
        assert_eq!(json["gst"], 324.0);
        assert_eq!(json["aov"], 2124.0);
        assert!(json.get("net_revenue_paise").is_none());

        let split = PaymentSplit {
            payment_method: PaymentMethod::Upi,
            total_paise: 99_950,
        };
        assert_eq!(serde_json::to_value(&split).unwrap()["total"], 999.5);
    }

    #[test]
    fn test_choice_option() {
        let option = ChoiceOption::same("Silk");
        assert_eq!(option.value, option.label);
    }

    #[test]
    fn test_inventory_group_size_is_plain_string() {
        let group = InventoryGroup {
            product: GroupProduct {
                id: "p1".to_string(),
                product_type: "Dupatta".to_string(),
                vendor_name: None,
            },
            size: Size::NoSize.display_code().to_string(),
            quantity: 4,
        };
        assert_eq!(serde_json::to_value(&group).unwrap()["size"], "NONE");
    }
}
