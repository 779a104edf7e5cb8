//! # Report Repository
//!
//! End-of-day report for one regional calendar day.
//!
//! The day is turned into UTC bounds `[start, end)` once, via
//! `analytics::day_bounds`, and every query filters on those bounds.

use chrono::{Duration, FixedOffset, NaiveDate};
use maguva_core::analytics::{day_bounds, gross_margin_percent};
use maguva_core::reports::{
    CategoryRevenue, DailyKpis, DailyOrder, DailyReport, LotTrace, PaymentSplit, StockAnalysis,
    VendorReceipt,
};
use maguva_core::{Money, LOW_STOCK_THRESHOLD, OLD_STOCK_DAYS};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the daily report.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Builds the report for `date` in the given regional offset.
    ///
    /// COGS is Σ base price × quantity of the day's lines, using the
    /// product's current base price. Lines of deleted products add nothing.
    pub async fn daily_report(&self, date: NaiveDate, offset: FixedOffset) -> DbResult<DailyReport> {
        let (start, end) = day_bounds(date, offset);
        debug!(%date, %start, %end, "Computing daily report");

        let (net_revenue, gst, bills): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_paise), 0), COALESCE(SUM(gst_paise), 0), COUNT(*)
            FROM orders
            WHERE created_at >= ? AND created_at < ?
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let (units, cogs): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0),
                   COALESCE(SUM(COALESCE(p.base_price_paise, 0) * oi.quantity), 0)
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE o.created_at >= ? AND o.created_at < ?
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let net_revenue = Money::from_paise(net_revenue);
        let gross_profit = net_revenue - Money::from_paise(cogs);
        let kpis = DailyKpis {
            net_revenue_paise: net_revenue.paise(),
            cogs_paise: cogs,
            gross_profit_paise: gross_profit.paise(),
            gm_percent: gross_margin_percent(gross_profit, net_revenue),
            gst_paise: gst,
            bills,
            units,
            aov_paise: net_revenue.average_over(bills).paise(),
        };

        let orders_today = sqlx::query_as::<_, DailyOrder>(
            r#"
            SELECT id, order_number, total_paise AS total_amount_paise, payment_method, created_at
            FROM orders
            WHERE created_at >= ? AND created_at < ?
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let category_revenue = sqlx::query_as::<_, CategoryRevenue>(
            r#"
            SELECT oi.product_name AS category, SUM(oi.line_total_paise) AS revenue_paise
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ? AND o.created_at < ?
            GROUP BY oi.product_name
            ORDER BY revenue_paise DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let payment_split = sqlx::query_as::<_, PaymentSplit>(
            r#"
            SELECT payment_method, SUM(total_paise) AS total_paise
            FROM orders
            WHERE created_at >= ? AND created_at < ?
            GROUP BY payment_method
            ORDER BY total_paise DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let vendor_instock = sqlx::query_as::<_, VendorReceipt>(
            r#"
            SELECT COALESCE(v.vendor_name, 'No Vendor') AS vendor_name, SUM(b.added_qty) AS total_qty
            FROM stock_batches b
            LEFT JOIN vendors v ON v.id = b.vendor_id
            WHERE b.created_at >= ? AND b.created_at < ?
            GROUP BY COALESCE(v.vendor_name, 'No Vendor')
            ORDER BY total_qty DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let (low_stock, out_of_stock): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(stock_count <= ?), 0), COALESCE(SUM(stock_count = 0), 0) FROM products",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await?;

        let old_stock_batches: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_batches WHERE created_at < ?")
                .bind(start - Duration::days(OLD_STOCK_DAYS))
                .fetch_one(&self.pool)
                .await?;

        let lot_trace = sqlx::query_as::<_, LotTrace>(
            r#"
            SELECT b.product_id, p.product_type AS product_name,
                   b.batch_number AS batch_no, b.added_qty AS qty
            FROM stock_batches b
            JOIN products p ON p.id = b.product_id
            WHERE b.created_at >= ? AND b.created_at < ?
            ORDER BY b.created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(DailyReport {
            report_date: date,
            kpis,
            orders_today,
            category_revenue,
            payment_split,
            vendor_instock,
            stock_analysis: StockAnalysis {
                low_stock,
                out_of_stock,
                old_stock_batches,
            },
            lot_trace,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::order::tests::{sale, sale_line};
    use crate::repository::test_support::{receipt, seed_product, seed_vendor, test_db};
    use chrono::Utc;
    use maguva_core::analytics::{local_date, regional_offset};
    use maguva_core::{PaymentMethod, Size};

    #[tokio::test]
    async fn test_daily_report() {
        let db = test_db().await;
        let offset = regional_offset(330);
        let vendor = seed_vendor(&db, "Anand Silks").await;
        let product = seed_product(&db, Some(&vendor.id)).await;
        let aged = seed_product(&db, None).await;

        let units = db
            .inventory()
            .receive_stock(&receipt(&product.id, &[(Size::Medium, 5)], None))
            .await
            .unwrap()
            .items;
        db.inventory()
            .receive_stock(&receipt(&aged.id, &[(Size::NoSize, 1)], None))
            .await
            .unwrap();
        sqlx::query("UPDATE stock_batches SET created_at = ? WHERE product_id = ?")
            .bind(Utc::now() - Duration::days(200))
            .bind(&aged.id)
            .execute(db.pool())
            .await
            .unwrap();

        db.orders()
            .create_sale(
                &sale(vec![
                    sale_line(&units[0], 100_000, 1_000),
                    sale_line(&units[1], 100_000, 1_000),
                ]),
                None,
            )
            .await
            .unwrap();

        let today = local_date(Utc::now(), offset);
        let report = db.reports().daily_report(today, offset).await.unwrap();

        assert_eq!(report.report_date, today);
        assert_eq!(report.kpis.net_revenue_paise, 212_400);
        assert_eq!(report.kpis.cogs_paise, 120_000);
        assert_eq!(report.kpis.gross_profit_paise, 92_400);
        assert!((report.kpis.gm_percent - 43.5).abs() < 1e-9);
        assert_eq!(report.kpis.gst_paise, 32_400);
        assert_eq!(report.kpis.bills, 1);
        assert_eq!(report.kpis.units, 2);
        assert_eq!(report.kpis.aov_paise, 212_400);

        assert_eq!(report.orders_today.len(), 1);
        assert_eq!(report.category_revenue[0].category, "Kurti");
        assert_eq!(report.category_revenue[0].revenue_paise, 180_000);
        assert_eq!(report.payment_split[0].payment_method, PaymentMethod::Upi);
        assert_eq!(report.payment_split[0].total_paise, 212_400);

        assert_eq!(report.vendor_instock.len(), 1);
        assert_eq!(report.vendor_instock[0].vendor_name, "Anand Silks");
        assert_eq!(report.vendor_instock[0].total_qty, 5);

        assert_eq!(report.stock_analysis.low_stock, 2);
        assert_eq!(report.stock_analysis.out_of_stock, 0);
        assert_eq!(report.stock_analysis.old_stock_batches, 1);

        assert_eq!(report.lot_trace.len(), 1);
        assert_eq!(report.lot_trace[0].product_id, product.id);
        assert_eq!(report.lot_trace[0].batch_no, 1);
        assert_eq!(report.lot_trace[0].qty, 5);
    }

    #[tokio::test]
    async fn test_empty_day() {
        let db = test_db().await;
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let report = db
            .reports()
            .daily_report(date, regional_offset(330))
            .await
            .unwrap();

        assert_eq!(report.kpis.net_revenue_paise, 0);
        assert_eq!(report.kpis.gm_percent, 0.0);
        assert_eq!(report.kpis.aov_paise, 0);
        assert!(report.orders_today.is_empty());
        assert!(report.lot_trace.is_empty());
    }
}
