//! # Order Repository
//!
//! POS sales. A sale touches four tables and must be all-or-nothing.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price_sale(lines)            ← totals computed before BEGIN           │
//! │       │                                                                 │
//! │       ▼  BEGIN IMMEDIATE                                                │
//! │  INSERT orders (header, unique order_number)                           │
//! │       │                                                                 │
//! │       ▼  for each line                                                  │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ unit exists?                     no  → NotFound                 │   │
//! │  │ unit.product_id == productId?    no  → ProductMismatch          │   │
//! │  │ sold_qty += q WHERE sold_qty + q <= added_qty                   │   │
//! │  │                                  0 rows → InsufficientStock     │   │
//! │  │ stock_count -= q WHERE stock_count >= q                         │   │
//! │  │ DELETE unit                      0 rows → NotFound (raced)      │   │
//! │  │ INSERT order_items (snapshot)                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼  COMMIT   (any error above drops the transaction → ROLLBACK)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use maguva_core::codes::{order_number, CODE_RETRY_ATTEMPTS};
use maguva_core::pricing::{price_sale, LineTotals, SaleTotals};
use maguva_core::requests::{SaleLineInput, SaleRequest};
use maguva_core::{
    CoreError, InventoryUnit, Order, OrderItem, OrderWithItems, User, ORDER_NUMBER_LEN,
};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::{begin_write, new_id};
use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct OrderRow {
    #[sqlx(flatten)]
    order: Order,
    created_by_email: Option<String>,
}

/// Repository for POS orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Records a sale and consumes its inventory units.
    ///
    /// `payment.amount_paise` of 0 is taken as exact tender (the order total).
    /// `cashier` is the signed-in user; its email is echoed on the order.
    ///
    /// ## Errors
    /// - Validation: empty lines, bad quantity, price or discount
    /// - `NotFound` for a missing unit, also when a concurrent sale took it
    /// - `ProductMismatch` when a unit belongs to another product
    /// - `InsufficientStock` when a batch or product counter would underflow
    pub async fn create_sale(
        &self,
        request: &SaleRequest,
        cashier: Option<&User>,
    ) -> DbResult<OrderWithItems> {
        request.validate()?;
        let totals = price_sale(&request.sale_lines())?;

        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();

        let created_by = cashier.map(|user| user.id.as_str());
        let order = insert_header(&mut tx, request, &totals, created_by, now).await?;

        let mut items = Vec::with_capacity(request.items.len());
        for (line, line_totals) in request.items.iter().zip(&totals.lines) {
            let item = sell_line(&mut tx, &order.id, line, line_totals, now).await?;
            items.push(item);
        }

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            total_paise = order.total_paise,
            lines = items.len(),
            "Sale recorded"
        );

        Ok(OrderWithItems {
            order,
            created_by_email: cashier.map(|user| user.email.clone()),
            items,
        })
    }

    /// Every order with its lines, newest first.
    pub async fn list(&self) -> DbResult<Vec<OrderWithItems>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.*, u.email AS created_by_email
            FROM orders o
            LEFT JOIN users u ON u.id = o.created_by
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id.clone()).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| OrderWithItems {
                items: by_order.remove(&row.order.id).unwrap_or_default(),
                created_by_email: row.created_by_email,
                order: row.order,
            })
            .collect())
    }

    /// Gets an order header by id.
    pub async fn get(&self, id: &str) -> DbResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn insert_header(
    tx: &mut Transaction<'_, Sqlite>,
    request: &SaleRequest,
    totals: &SaleTotals,
    created_by: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<Order> {
    let payment_amount = if request.payment.amount_paise == 0 {
        totals.total.paise()
    } else {
        request.payment.amount_paise
    };

    for attempt in 1..=CODE_RETRY_ATTEMPTS {
        let order = Order {
            id: new_id(),
            order_number: order_number(&mut rand::thread_rng(), ORDER_NUMBER_LEN),
            customer_name: request.customer.name.trim().to_string(),
            customer_mobile: request.customer.mobile.trim().to_string(),
            subtotal_paise: totals.subtotal.paise(),
            discount_total_paise: totals.discount_total.paise(),
            gst_rate_bps: totals.gst_rate.bps(),
            gst_paise: totals.gst.paise(),
            total_paise: totals.total.paise(),
            payment_method: request.payment.method,
            payment_amount_paise: payment_amount,
            created_by: created_by.map(str::to_string),
            created_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_name, customer_mobile, subtotal_paise,
                discount_total_paise, gst_rate_bps, gst_paise, total_paise,
                payment_method, payment_amount_paise, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(&order.customer_mobile)
        .bind(order.subtotal_paise)
        .bind(order.discount_total_paise)
        .bind(order.gst_rate_bps)
        .bind(order.gst_paise)
        .bind(order.total_paise)
        .bind(order.payment_method)
        .bind(order.payment_amount_paise)
        .bind(&order.created_by)
        .bind(order.created_at)
        .execute(&mut **tx)
        .await;

        match result.map_err(DbError::from) {
            Ok(_) => return Ok(order),
            Err(e) if e.is_unique_violation_on("orders.order_number") => {
                warn!(attempt, "Order number collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(DbError::Internal(
        "Could not generate a unique order number".to_string(),
    ))
}

/// Consumes one unit and writes its order line.
async fn sell_line(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: &str,
    line: &SaleLineInput,
    line_totals: &LineTotals,
    now: DateTime<Utc>,
) -> DbResult<OrderItem> {
    let unit = sqlx::query_as::<_, InventoryUnit>("SELECT * FROM inventory WHERE id = ?")
        .bind(&line.inventory_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DbError::not_found("Inventory", &line.inventory_id))?;

    if unit.product_id != line.product_id {
        return Err(CoreError::ProductMismatch {
            inventory_id: unit.id,
            product_id: line.product_id.clone(),
        }
        .into());
    }

    let product_name: String = sqlx::query_scalar("SELECT product_type FROM products WHERE id = ?")
        .bind(&unit.product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", &unit.product_id))?;

    let sold = sqlx::query(
        "UPDATE stock_batches SET sold_qty = sold_qty + ?1 WHERE id = ?2 AND sold_qty + ?1 <= added_qty",
    )
    .bind(line.quantity)
    .bind(&unit.batch_id)
    .execute(&mut **tx)
    .await?;

    if sold.rows_affected() == 0 {
        let available: Option<i64> =
            sqlx::query_scalar("SELECT added_qty - sold_qty FROM stock_batches WHERE id = ?")
                .bind(&unit.batch_id)
                .fetch_optional(&mut **tx)
                .await?;
        debug!(batch_id = %unit.batch_id, "Batch cannot cover sale line");
        return Err(CoreError::InsufficientStock {
            sku: unit.sku,
            available: available.unwrap_or(0),
            requested: line.quantity,
        }
        .into());
    }

    let stocked = sqlx::query(
        "UPDATE products SET stock_count = stock_count - ?1, updated_at = ?2 WHERE id = ?3 AND stock_count >= ?1",
    )
    .bind(line.quantity)
    .bind(now)
    .bind(&unit.product_id)
    .execute(&mut **tx)
    .await?;

    if stocked.rows_affected() == 0 {
        let available: Option<i64> =
            sqlx::query_scalar("SELECT stock_count FROM products WHERE id = ?")
                .bind(&unit.product_id)
                .fetch_optional(&mut **tx)
                .await?;
        return Err(CoreError::InsufficientStock {
            sku: unit.sku,
            available: available.unwrap_or(0),
            requested: line.quantity,
        }
        .into());
    }

    let deleted = sqlx::query("DELETE FROM inventory WHERE id = ?")
        .bind(&unit.id)
        .execute(&mut **tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(DbError::not_found("Inventory", &unit.id));
    }

    let item = OrderItem {
        id: new_id(),
        order_id: order_id.to_string(),
        product_name,
        sku: unit.sku,
        size: unit.size.code().to_string(),
        price_paise: line.price_paise,
        discount_bps: line.discount_bps,
        discount_paise: line_totals.unit_discount.paise(),
        quantity: line.quantity,
        line_total_paise: line_totals.line_total.paise(),
        inventory_id: unit.id,
        product_id: unit.product_id,
        batch_id: Some(unit.batch_id),
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_name, sku, size, price_paise, discount_bps,
            discount_paise, quantity, line_total_paise, inventory_id, product_id,
            batch_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_name)
    .bind(&item.sku)
    .bind(&item.size)
    .bind(item.price_paise)
    .bind(item.discount_bps)
    .bind(item.discount_paise)
    .bind(item.quantity)
    .bind(item.line_total_paise)
    .bind(&item.inventory_id)
    .bind(&item.product_id)
    .bind(&item.batch_id)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(item)
}

// =============================================================================
// Tests
// =============================================================================
