//! # Analytics Repository
//!
//! Read-only aggregates for the dashboard and the per-vendor view.
//! Nothing is cached; every call recomputes from the ledger tables.
//!
//! ## Windows
//! ```text
//!   previous_start          start                      end (now)
//!        │◄──── previous ─────►│◄──────── current ────────►│
//!        [                     )[                          ]
//! ```
//!
//! Month buckets are built in Rust from the order timestamps so they follow
//! the regional offset instead of SQLite's UTC date functions.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, Utc};
use maguva_core::analytics::{growth, month_key, month_label, month_start, AnalyticsWindow};
use maguva_core::reports::{
    BatchStock, DashboardAnalytics, DashboardPeriod, KeyMetrics, LowStockProduct,
    MonthlyOrders, MonthlyRevenue, PaymentStat, ProductStockDetail, RecentOrder, StockCounts,
    TopBatch, TopProduct, TopVendorProduct, VendorAnalytics, VendorPerformance,
};
use maguva_core::{
    FabricType, Money, PaymentMethod, ProductType, DASHBOARD_LOW_STOCK_THRESHOLD,
    LOW_STOCK_THRESHOLD,
};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use super::vendor::VendorRepository;
use crate::error::DbResult;

const RECENT_ORDERS_LIMIT: i64 = 10;
const TOP_LIMIT: i64 = 10;
const LOW_STOCK_LIST_LIMIT: i64 = 20;

#[derive(Debug, FromRow)]
struct RecentOrderRow {
    id: String,
    order_number: String,
    customer_name: String,
    customer_mobile: String,
    total_paise: i64,
    payment_method: PaymentMethod,
    items_count: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LowStockRow {
    id: String,
    product_type: ProductType,
    fabric_type: FabricType,
    sku: String,
    stock_count: i64,
    vendor_name: Option<String>,
    base_price_paise: i64,
    color_code: String,
}

#[derive(Debug, FromRow)]
struct BatchRow {
    product_id: String,
    id: String,
    batch_number: i64,
    added_qty: i64,
    sold_qty: i64,
}

/// Repository for dashboard and vendor analytics.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Builds the dashboard for the `days` ending at `now`.
    pub async fn dashboard(
        &self,
        days: i64,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> DbResult<DashboardAnalytics> {
        let window = AnalyticsWindow::from_days(days, now)?;
        debug!(days, start = %window.start, "Computing dashboard");

        let key_metrics = self.key_metrics(&window).await?;
        let (monthly_revenue, monthly_orders) = self.monthly_trends(&window, offset).await?;

        let items_sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0)
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ? AND o.created_at <= ?
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        let (low_stock, out_of_stock): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(stock_count < ?), 0), COALESCE(SUM(stock_count = 0), 0)
            FROM products
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await?;

        let new_products_this_month: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE created_at >= ?")
                .bind(month_start(now, offset))
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardAnalytics {
            period: DashboardPeriod {
                days: window.days,
                start: window.start,
                end: window.end,
            },
            key_metrics,
            monthly_revenue,
            monthly_orders,
            recent_orders: self.recent_orders().await?,
            top_products: self.top_products(&window).await?,
            low_stock_products: self.low_stock_products().await?,
            payment_methods: self.payment_stats(&window).await?,
            vendor_performance: self.vendor_performance(&window).await?,
            items_sold,
            products: StockCounts {
                low_stock,
                out_of_stock,
            },
            new_products_this_month,
        })
    }

    async fn key_metrics(&self, window: &AnalyticsWindow) -> DbResult<KeyMetrics> {
        let (revenue, orders): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_paise), 0), COUNT(*) FROM orders WHERE created_at >= ? AND created_at <= ?",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        let (previous_revenue, previous_orders): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_paise), 0), COUNT(*) FROM orders WHERE created_at >= ? AND created_at < ?",
        )
        .bind(window.previous_start)
        .bind(window.start)
        .fetch_one(&self.pool)
        .await?;

        let (total_products, inventory_value): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(base_price_paise * stock_count), 0) FROM products",
        )
        .fetch_one(&self.pool)
        .await?;

        let revenue = Money::from_paise(revenue);
        Ok(KeyMetrics {
            total_revenue_paise: revenue.paise(),
            total_orders: orders,
            total_products,
            total_inventory_value_paise: inventory_value,
            revenue_growth: growth(
                Money::from_paise(previous_revenue).as_rupees_f64(),
                revenue.as_rupees_f64(),
            ),
            orders_growth: growth(previous_orders as f64, orders as f64),
            avg_order_value_paise: revenue.average_over(orders).paise(),
        })
    }

    async fn monthly_trends(
        &self,
        window: &AnalyticsWindow,
        offset: FixedOffset,
    ) -> DbResult<(Vec<MonthlyRevenue>, Vec<MonthlyOrders>)> {
        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            "SELECT created_at, total_paise FROM orders WHERE created_at >= ? AND created_at <= ?",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        // key → (label, revenue, orders)
        let mut buckets: BTreeMap<String, (String, i64, i64)> = BTreeMap::new();
        for (created_at, total) in rows {
            let bucket = buckets
                .entry(month_key(created_at, offset))
                .or_insert_with(|| (month_label(created_at, offset), 0, 0));
            bucket.1 += total;
            bucket.2 += 1;
        }

        let revenue = buckets
            .values()
            .map(|(month, revenue, _)| MonthlyRevenue {
                month: month.clone(),
                revenue_paise: *revenue,
            })
            .collect();
        let orders = buckets
            .into_values()
            .map(|(month, _, orders)| MonthlyOrders { month, orders })
            .collect();

        Ok((revenue, orders))
    }

    async fn recent_orders(&self) -> DbResult<Vec<RecentOrder>> {
        let rows = sqlx::query_as::<_, RecentOrderRow>(
            r#"
            SELECT o.id, o.order_number, o.customer_name, o.customer_mobile, o.total_paise,
                   o.payment_method, o.created_at,
                   (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS items_count
            FROM orders o
            ORDER BY o.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(RECENT_ORDERS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RecentOrder {
                id: row.id,
                order_number: row.order_number,
                customer_name: if row.customer_name.trim().is_empty() {
                    "Walk-in Customer".to_string()
                } else {
                    row.customer_name
                },
                customer_mobile: row.customer_mobile,
                total_amount_paise: row.total_paise,
                payment_method: row.payment_method,
                items_count: row.items_count,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn top_products(&self, window: &AnalyticsWindow) -> DbResult<Vec<TopProduct>> {
        let products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT oi.product_name AS product_type,
                   SUM(oi.line_total_paise) AS revenue_paise,
                   SUM(oi.quantity) AS quantity_sold
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ? AND o.created_at <= ?
            GROUP BY oi.product_name
            ORDER BY revenue_paise DESC
            LIMIT ?
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(TOP_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn low_stock_products(&self) -> DbResult<Vec<LowStockProduct>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT p.id, p.product_type, p.fabric_type, p.sku, p.stock_count,
                   v.vendor_name AS vendor_name, p.base_price_paise, p.color_code
            FROM products p
            LEFT JOIN vendors v ON v.id = p.vendor_id
            WHERE p.stock_count <= ?
            ORDER BY p.stock_count, p.created_at
            LIMIT ?
            "#,
        )
        .bind(DASHBOARD_LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LowStockProduct {
                id: row.id,
                product_name: format!("{} - {}", row.product_type.as_str(), row.fabric_type.as_str()),
                sku: row.sku,
                stock_count: row.stock_count,
                vendor_name: row.vendor_name.unwrap_or_else(|| "No Vendor".to_string()),
                base_price_paise: row.base_price_paise,
                color_code: row.color_code,
            })
            .collect())
    }

    async fn payment_stats(&self, window: &AnalyticsWindow) -> DbResult<Vec<PaymentStat>> {
        let stats = sqlx::query_as::<_, PaymentStat>(
            r#"
            SELECT payment_method AS method, COUNT(*) AS count, SUM(total_paise) AS revenue_paise
            FROM orders
            WHERE created_at >= ? AND created_at <= ?
            GROUP BY payment_method
            ORDER BY count DESC, revenue_paise DESC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn vendor_performance(&self, window: &AnalyticsWindow) -> DbResult<Vec<VendorPerformance>> {
        let vendors = sqlx::query_as::<_, VendorPerformance>(
            r#"
            SELECT v.id AS vendor_id, v.vendor_name,
                   SUM(oi.line_total_paise) AS total_revenue_paise,
                   (SELECT COUNT(*) FROM products vp WHERE vp.vendor_id = v.id) AS product_count,
                   COUNT(DISTINCT oi.order_id) AS order_count
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            JOIN vendors v ON v.id = p.vendor_id
            WHERE o.created_at >= ? AND o.created_at <= ?
            GROUP BY v.id
            HAVING SUM(oi.line_total_paise) > 0
            ORDER BY total_revenue_paise DESC
            LIMIT ?
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(TOP_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    // =========================================================================
    // Vendor Analytics
    // =========================================================================

    /// Stock and month-to-date sales of one vendor's products.
    pub async fn vendor_analytics(
        &self,
        vendor_id: &str,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> DbResult<VendorAnalytics> {
        let vendor = VendorRepository::new(self.pool.clone()).get(vendor_id).await?;
        let since = month_start(now, offset);

        let products: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, product_type FROM products WHERE vendor_id = ? ORDER BY created_at, rowid",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        let batches = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT b.product_id, b.id, b.batch_number, b.added_qty, b.sold_qty
            FROM stock_batches b
            JOIN products p ON p.id = b.product_id
            WHERE p.vendor_id = ?
            ORDER BY b.batch_number
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        let month_sold_stock: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0)
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE p.vendor_id = ? AND o.created_at >= ?
            "#,
        )
        .bind(vendor_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let top_batches_this_month = sqlx::query_as::<_, TopBatch>(
            r#"
            SELECT b.id AS batch_id, b.batch_number, SUM(oi.quantity) AS sold
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            JOIN stock_batches b ON b.id = oi.batch_id
            WHERE p.vendor_id = ? AND o.created_at >= ?
            GROUP BY b.id
            ORDER BY sold DESC, b.batch_number
            LIMIT ?
            "#,
        )
        .bind(vendor_id)
        .bind(since)
        .bind(TOP_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let top_products_this_month = sqlx::query_as::<_, TopVendorProduct>(
            r#"
            SELECT p.id AS product_id, p.product_type, SUM(oi.quantity) AS sold
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE p.vendor_id = ? AND o.created_at >= ?
            GROUP BY p.id
            ORDER BY sold DESC
            LIMIT ?
            "#,
        )
        .bind(vendor_id)
        .bind(since)
        .bind(TOP_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let mut by_product: HashMap<String, Vec<BatchStock>> = HashMap::new();
        for row in batches {
            by_product.entry(row.product_id).or_default().push(BatchStock {
                id: row.id,
                batch_number: row.batch_number,
                added_qty: row.added_qty,
                sold_qty: row.sold_qty,
                available_qty: row.added_qty - row.sold_qty,
            });
        }

        let product_stock_details: Vec<ProductStockDetail> = products
            .iter()
            .map(|(product_id, product_type)| {
                let batches = by_product.remove(product_id).unwrap_or_default();
                let total_added = batches.iter().map(|b| b.added_qty).sum();
                let total_sold = batches.iter().map(|b| b.sold_qty).sum();
                ProductStockDetail {
                    product_id: product_id.clone(),
                    product_type: product_type.clone(),
                    total_added,
                    total_sold,
                    total_available: total_added - total_sold,
                    batches,
                }
            })
            .collect();

        Ok(VendorAnalytics {
            vendor_id: vendor.id,
            vendor_name: vendor.vendor_name,
            total_products: products.len() as i64,
            total_stock: product_stock_details.iter().map(|p| p.total_available).sum(),
            month_sold_stock,
            top_batches_this_month,
            top_products_this_month,
            product_stock_details,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::order::tests::{sale, sale_line};
    use crate::repository::test_support::{receipt, seed_product, seed_vendor, test_db};
    use chrono::Duration;
    use maguva_core::analytics::regional_offset;
    use maguva_core::Size;

    #[tokio::test]
    async fn test_dashboard_metrics() {
        let db = test_db().await;
        let offset = regional_offset(330);
        let vendor = seed_vendor(&db, "Anand Silks").await;
        let stocked = seed_product(&db, Some(&vendor.id)).await;
        let empty = seed_product(&db, None).await;

        let units = db
            .inventory()
            .receive_stock(&receipt(&stocked.id, &[(Size::Medium, 5)], None))
            .await
            .unwrap()
            .items;

        let old = db
            .orders()
            .create_sale(&sale(vec![sale_line(&units[0], 100_000, 0)]), None)
            .await
            .unwrap();
        sqlx::query("UPDATE orders SET created_at = ? WHERE id = ?")
            .bind(Utc::now() - Duration::days(45))
            .bind(&old.order.id)
            .execute(db.pool())
            .await
            .unwrap();

        let mut walk_in = sale(vec![
            sale_line(&units[1], 100_000, 1_000),
            sale_line(&units[2], 100_000, 1_000),
        ]);
        walk_in.customer.name = "  ".to_string();
        db.orders().create_sale(&walk_in, None).await.unwrap();

        let dashboard = db
            .analytics()
            .dashboard(30, Utc::now(), offset)
            .await
            .unwrap();

        let metrics = &dashboard.key_metrics;
        assert_eq!(metrics.total_revenue_paise, 212_400);
        assert_eq!(metrics.total_orders, 1);
        assert_eq!(metrics.total_products, 2);
        assert_eq!(metrics.total_inventory_value_paise, 2 * 60_000);
        assert_eq!(metrics.avg_order_value_paise, 212_400);
        assert_eq!(metrics.orders_growth, 0.0);
        assert_eq!(metrics.revenue_growth, 80.0);

        assert_eq!(dashboard.items_sold, 2);
        assert_eq!(dashboard.monthly_revenue.len(), 1);
        assert_eq!(dashboard.monthly_revenue[0].revenue_paise, 212_400);
        assert_eq!(dashboard.monthly_orders[0].orders, 1);

        assert_eq!(dashboard.recent_orders.len(), 2);
        assert_eq!(dashboard.recent_orders[0].customer_name, "Walk-in Customer");
        assert_eq!(dashboard.recent_orders[0].items_count, 2);
        assert_eq!(dashboard.recent_orders[1].customer_name, "Lakshmi");

        assert_eq!(dashboard.top_products.len(), 1);
        assert_eq!(dashboard.top_products[0].product_type, "Kurti");
        assert_eq!(dashboard.top_products[0].revenue_paise, 180_000);
        assert_eq!(dashboard.top_products[0].quantity_sold, 2);

        assert_eq!(dashboard.payment_methods.len(), 1);
        assert_eq!(dashboard.payment_methods[0].method, PaymentMethod::Upi);

        assert_eq!(dashboard.vendor_performance.len(), 1);
        assert_eq!(dashboard.vendor_performance[0].total_revenue_paise, 180_000);
        assert_eq!(dashboard.vendor_performance[0].product_count, 1);
        assert_eq!(dashboard.vendor_performance[0].order_count, 1);

        assert_eq!(dashboard.low_stock_products.len(), 2);
        assert_eq!(dashboard.low_stock_products[0].id, empty.id);
        assert_eq!(dashboard.low_stock_products[0].vendor_name, "No Vendor");
        assert_eq!(dashboard.low_stock_products[0].product_name, "Kurti - Cotton");
        assert_eq!(dashboard.low_stock_products[1].vendor_name, "Anand Silks");

        assert_eq!(dashboard.products.low_stock, 2);
        assert_eq!(dashboard.products.out_of_stock, 1);
        assert_eq!(dashboard.new_products_this_month, 2);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_window() {
        let db = test_db().await;
        let result = db
            .analytics()
            .dashboard(0, Utc::now(), regional_offset(330))
            .await;
        assert!(matches!(result, Err(DbError::Domain(_))));
    }

    #[tokio::test]
    async fn test_vendor_analytics() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Anand Silks").await;
        let product = seed_product(&db, Some(&vendor.id)).await;
        let idle = seed_product(&db, Some(&vendor.id)).await;

        let first = db
            .inventory()
            .receive_stock(&receipt(&product.id, &[(Size::Small, 3)], None))
            .await
            .unwrap();
        db.inventory()
            .receive_stock(&receipt(&product.id, &[(Size::Large, 4)], None))
            .await
            .unwrap();

        db.orders()
            .create_sale(
                &sale(vec![
                    sale_line(&first.items[0], 50_000, 0),
                    sale_line(&first.items[1], 50_000, 0),
                ]),
                None,
            )
            .await
            .unwrap();

        let analytics = db
            .analytics()
            .vendor_analytics(&vendor.id, Utc::now(), regional_offset(330))
            .await
            .unwrap();

        assert_eq!(analytics.vendor_name, "Anand Silks");
        assert_eq!(analytics.total_products, 2);
        assert_eq!(analytics.total_stock, 5);
        assert_eq!(analytics.month_sold_stock, 2);

        assert_eq!(analytics.top_batches_this_month.len(), 1);
        assert_eq!(analytics.top_batches_this_month[0].batch_number, 1);
        assert_eq!(analytics.top_batches_this_month[0].sold, 2);
        assert_eq!(analytics.top_products_this_month[0].product_id, product.id);

        let detail = &analytics.product_stock_details[0];
        assert_eq!(detail.total_added, 7);
        assert_eq!(detail.total_sold, 2);
        assert_eq!(detail.total_available, 5);
        assert_eq!(
            detail.batches.iter().map(|b| b.batch_number).collect::<Vec<_>>(),
            vec![1, 2]
        );

        let idle_detail = &analytics.product_stock_details[1];
        assert_eq!(idle_detail.product_id, idle.id);
        assert!(idle_detail.batches.is_empty());

        assert!(matches!(
            db.analytics()
                .vendor_analytics("missing", Utc::now(), regional_offset(330))
                .await,
            Err(DbError::NotFound { .. })
        ));
    }
}
