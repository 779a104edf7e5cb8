//! # Tailor Repository
//!
//! Tailoring orders and their item details.
//!
//! ## Lifecycle
//! ```text
//!   create ──► ordered ──── record_payment (exact balance) ────► delivered
//!                │  ▲                                               │
//!                │  └── update fields / items                       │
//!                └───── delete order / delete item                  ▼
//!                                                               frozen
//! ```
//!
//! Every write recomputes `balance_paise` from total and advance; the
//! schema CHECK rejects any row where they disagree.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use maguva_core::codes::{order_number, CODE_RETRY_ATTEMPTS};
use maguva_core::requests::{PaymentInput, TailorOrderInput, TailorOrderPatch};
use maguva_core::tailoring::{
    apply_payment, balance, ensure_editable, normalize_mobile, validate_amounts,
    validate_item_count,
};
use maguva_core::{
    Money, TailorOrder, TailorOrderItem, TailorOrderWithItems, TailorStatus,
    TAILOR_ORDER_NUMBER_LEN,
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::{begin_write, new_id};
use crate::error::{DbError, DbResult};

/// Repository for tailoring orders.
#[derive(Debug, Clone)]
pub struct TailorRepository {
    pool: SqlitePool,
}

impl TailorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TailorRepository { pool }
    }

    /// Every order with its items, newest first.
    pub async fn list(&self) -> DbResult<Vec<TailorOrderWithItems>> {
        let orders = sqlx::query_as::<_, TailorOrder>(
            "SELECT * FROM tailor_orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, TailorOrderItem>(
            "SELECT * FROM tailor_order_items ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<TailorOrderItem>> = HashMap::new();
        for item in items {
            by_order
                .entry(item.tailor_order_id.clone())
                .or_default()
                .push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| TailorOrderWithItems {
                item_details: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }

    /// Gets an order with its items.
    pub async fn get(&self, id: &str) -> DbResult<TailorOrderWithItems> {
        let order = self.get_order(id).await?;
        let item_details = sqlx::query_as::<_, TailorOrderItem>(
            "SELECT * FROM tailor_order_items WHERE tailor_order_id = ? ORDER BY rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TailorOrderWithItems {
            order,
            item_details,
        })
    }

    /// Creates an order in `ordered` state with its items.
    pub async fn create(&self, input: &TailorOrderInput) -> DbResult<TailorOrderWithItems> {
        input.validate()?;

        let total = Money::from_paise(input.total_paise);
        let advance = Money::from_paise(input.advance_paise);
        let now = Utc::now();

        let mut tx = begin_write(&self.pool).await?;
        let mut inserted = None;

        for attempt in 1..=CODE_RETRY_ATTEMPTS {
            let order = TailorOrder {
                id: new_id(),
                order_number: order_number(&mut rand::thread_rng(), TAILOR_ORDER_NUMBER_LEN),
                customer_name: input.customer_name.trim().to_string(),
                customer_mobile: normalize_mobile(&input.customer_mobile),
                product_name: input.product_name.trim().to_string(),
                description: input.description.trim().to_string(),
                order_date: input.order_date.unwrap_or(now),
                delivery_date: input.delivery_date,
                total_paise: total.paise(),
                advance_paise: advance.paise(),
                balance_paise: balance(total, advance).paise(),
                status: TailorStatus::Ordered,
                created_at: now,
                updated_at: now,
            };

            match insert_order(&mut tx, &order).await {
                Ok(()) => {
                    inserted = Some(order);
                    break;
                }
                Err(e) if e.is_unique_violation_on("tailor_orders.order_number") => {
                    warn!(attempt, "Tailor order number collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        let order = inserted.ok_or_else(|| {
            DbError::Internal("Could not generate a unique tailor order number".to_string())
        })?;

        for item in &input.item_details {
            insert_item(
                &mut tx,
                &order.id,
                &item.item_name,
                item.quantity,
                item.remarks.as_deref(),
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            items = input.item_details.len(),
            "Tailor order created"
        );
        self.get(&order.id).await
    }

    /// Updates fields and, when given, reconciles the item list.
    ///
    /// ## Item Reconciliation
    /// - item with a known id → updated
    /// - item without id → created
    /// - item with an unknown id → skipped
    /// - stored item not mentioned → deleted
    ///
    /// At least one item must remain afterwards.
    pub async fn update(&self, id: &str, patch: TailorOrderPatch) -> DbResult<TailorOrderWithItems> {
        patch.validate_fields()?;

        let mut tx = begin_write(&self.pool).await?;

        let current = sqlx::query_as::<_, TailorOrder>("SELECT * FROM tailor_orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Tailor order", id))?;

        ensure_editable(&current.order_number, current.status)?;

        let total = Money::from_paise(patch.total_paise.unwrap_or(current.total_paise));
        let advance = Money::from_paise(patch.advance_paise.unwrap_or(current.advance_paise));
        validate_amounts(total, advance)?;

        sqlx::query(
            r#"
            UPDATE tailor_orders SET
                customer_name = ?, customer_mobile = ?, product_name = ?, description = ?,
                order_date = ?, delivery_date = ?, total_paise = ?, advance_paise = ?,
                balance_paise = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(
            patch
                .customer_name
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.customer_name),
        )
        .bind(
            patch
                .customer_mobile
                .as_deref()
                .map(normalize_mobile)
                .unwrap_or_else(|| current.customer_mobile.clone()),
        )
        .bind(
            patch
                .product_name
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.product_name),
        )
        .bind(
            patch
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.description),
        )
        .bind(patch.order_date.unwrap_or(current.order_date))
        .bind(patch.delivery_date.unwrap_or(current.delivery_date))
        .bind(total.paise())
        .bind(advance.paise())
        .bind(balance(total, advance).paise())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(items) = &patch.item_details {
            let stored: HashSet<String> = sqlx::query_scalar(
                "SELECT id FROM tailor_order_items WHERE tailor_order_id = ?",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

            let mut kept = HashSet::new();
            for item in items {
                match item.id.as_deref().filter(|s| !s.is_empty()) {
                    Some(item_id) if stored.contains(item_id) => {
                        sqlx::query(
                            "UPDATE tailor_order_items SET item_name = ?, quantity = ?, remarks = ? WHERE id = ?",
                        )
                        .bind(item.item_name.trim())
                        .bind(item.quantity)
                        .bind(&item.remarks)
                        .bind(item_id)
                        .execute(&mut *tx)
                        .await?;
                        kept.insert(item_id.to_string());
                    }
                    Some(item_id) => {
                        debug!(item_id, "Skipping unknown tailor item id");
                    }
                    None => {
                        let new_id = insert_item(
                            &mut tx,
                            id,
                            &item.item_name,
                            item.quantity,
                            item.remarks.as_deref(),
                        )
                        .await?;
                        kept.insert(new_id);
                    }
                }
            }

            for stale in stored.difference(&kept) {
                sqlx::query("DELETE FROM tailor_order_items WHERE id = ?")
                    .bind(stale)
                    .execute(&mut *tx)
                    .await?;
            }

            validate_item_count(kept.len())?;
        }

        tx.commit().await?;

        info!(order_number = %current.order_number, "Tailor order updated");
        self.get(id).await
    }

    /// Records the final payment. Only an exact payoff is accepted.
    pub async fn record_payment(
        &self,
        id: &str,
        payment: PaymentInput,
    ) -> DbResult<TailorOrderWithItems> {
        let order = self.get_order(id).await?;

        let outcome = apply_payment(
            &order.order_number,
            order.status,
            order.total(),
            order.advance(),
            Money::from_paise(payment.amount_paise),
        )?;

        let result = sqlx::query(
            r#"
            UPDATE tailor_orders
            SET advance_paise = ?, balance_paise = ?, status = ?, updated_at = ?
            WHERE id = ? AND status = 'ordered' AND advance_paise = ?
            "#,
        )
        .bind(outcome.advance.paise())
        .bind(outcome.balance.paise())
        .bind(outcome.status)
        .bind(Utc::now())
        .bind(id)
        .bind(order.advance_paise)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // another payment landed between the read and the write
            let latest = self.get_order(id).await?;
            ensure_editable(&latest.order_number, latest.status)?;
            return Err(DbError::TransactionFailed(format!(
                "Tailor order {} changed during payment",
                latest.order_number
            )));
        }

        info!(
            order_number = %order.order_number,
            amount_paise = payment.amount_paise,
            "Tailor order paid and delivered"
        );
        self.get(id).await
    }

    /// Deletes an open order with its items. Returns the order number.
    pub async fn delete(&self, id: &str) -> DbResult<String> {
        let order = self.get_order(id).await?;
        ensure_editable(&order.order_number, order.status)?;

        let deleted = sqlx::query("DELETE FROM tailor_orders WHERE id = ? AND status = 'ordered'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            // paid or removed since the read
            let latest = self.get_order(id).await?;
            ensure_editable(&latest.order_number, latest.status)?;
            return Err(DbError::TransactionFailed(format!(
                "Tailor order {} changed during delete",
                latest.order_number
            )));
        }

        info!(order_number = %order.order_number, "Tailor order deleted");
        Ok(order.order_number)
    }

    /// Deletes one item of an open order.
    ///
    /// The status check is part of the DELETE itself; the parent is only
    /// read to explain a miss.
    pub async fn delete_item(&self, item_id: &str) -> DbResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM tailor_order_items
            WHERE id = ?
              AND tailor_order_id IN (SELECT id FROM tailor_orders WHERE status = 'ordered')
            "#,
        )
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        if deleted.rows_affected() == 0 {
            let parent: Option<(String, TailorStatus)> = sqlx::query_as(
                r#"
                SELECT o.order_number, o.status
                FROM tailor_order_items i
                JOIN tailor_orders o ON o.id = i.tailor_order_id
                WHERE i.id = ?
                "#,
            )
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;

            let (order_number, status) =
                parent.ok_or_else(|| DbError::not_found("Tailor order item", item_id))?;
            ensure_editable(&order_number, status)?;
            return Err(DbError::TransactionFailed(format!(
                "Tailor order {order_number} changed during item delete"
            )));
        }

        info!(item_id, "Tailor order item deleted");
        Ok(())
    }

    async fn get_order(&self, id: &str) -> DbResult<TailorOrder> {
        sqlx::query_as::<_, TailorOrder>("SELECT * FROM tailor_orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Tailor order", id))
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &TailorOrder) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO tailor_orders (
            id, order_number, customer_name, customer_mobile, product_name, description,
            order_date, delivery_date, total_paise, advance_paise, balance_paise, status,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.customer_name)
    .bind(&order.customer_mobile)
    .bind(&order.product_name)
    .bind(&order.description)
    .bind(order.order_date)
    .bind(order.delivery_date)
    .bind(order.total_paise)
    .bind(order.advance_paise)
    .bind(order.balance_paise)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_item(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: &str,
    item_name: &str,
    quantity: i64,
    remarks: Option<&str>,
) -> DbResult<String> {
    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO tailor_order_items (id, tailor_order_id, item_name, quantity, remarks)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(order_id)
    .bind(item_name.trim())
    .bind(quantity)
    .bind(remarks)
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use chrono::NaiveDate;
    use maguva_core::requests::{TailorItemInput, TailorItemPatch};
    use maguva_core::CoreError;

    fn order_input(total: i64, advance: i64) -> TailorOrderInput {
        TailorOrderInput {
            customer_name: "Priya".to_string(),
            customer_mobile: "09876543210".to_string(),
            product_name: "Blouse stitching".to_string(),
            description: "Boat neck".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            order_date: None,
            total_paise: total,
            advance_paise: advance,
            item_details: vec![
                TailorItemInput {
                    item_name: "Blouse".to_string(),
                    quantity: 2,
                    remarks: Some("lining".to_string()),
                },
                TailorItemInput {
                    item_name: "Fall & pico".to_string(),
                    quantity: 1,
                    remarks: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_db().await;
        let created = db.tailor().create(&order_input(150_000, 50_000)).await.unwrap();

        assert_eq!(created.order.order_number.len(), 8);
        assert_eq!(created.order.customer_mobile, "9876543210");
        assert_eq!(created.order.balance_paise, 100_000);
        assert_eq!(created.order.status, TailorStatus::Ordered);
        assert_eq!(created.item_details.len(), 2);
        assert_eq!(created.item_details[0].item_name, "Blouse");

        let listed = db.tailor().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].item_details.len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_amounts_and_no_items() {
        let db = test_db().await;
        assert!(matches!(
            db.tailor().create(&order_input(10_000, 20_000)).await,
            Err(DbError::Domain(CoreError::AdvanceExceedsTotal { .. }))
        ));

        let mut empty = order_input(10_000, 0);
        empty.item_details.clear();
        assert!(matches!(
            db.tailor().create(&empty).await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));
        assert!(db.tailor().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_reconciles_items() {
        let db = test_db().await;
        let created = db.tailor().create(&order_input(150_000, 50_000)).await.unwrap();
        let keep = created.item_details[0].clone();

        let updated = db
            .tailor()
            .update(
                &created.order.id,
                TailorOrderPatch {
                    total_paise: Some(200_000),
                    item_details: Some(vec![
                        TailorItemPatch {
                            id: Some(keep.id.clone()),
                            item_name: "Blouse (padded)".to_string(),
                            quantity: 3,
                            remarks: None,
                        },
                        TailorItemPatch {
                            id: None,
                            item_name: "Saree pleating".to_string(),
                            quantity: 1,
                            remarks: None,
                        },
                        TailorItemPatch {
                            id: Some("unknown".to_string()),
                            item_name: "Ignored".to_string(),
                            quantity: 1,
                            remarks: None,
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.order.total_paise, 200_000);
        assert_eq!(updated.order.balance_paise, 150_000);
        assert_eq!(updated.order.customer_name, "Priya");

        let names: Vec<_> = updated
            .item_details
            .iter()
            .map(|i| i.item_name.as_str())
            .collect();
        assert_eq!(names, vec!["Blouse (padded)", "Saree pleating"]);
        assert_eq!(updated.item_details[0].id, keep.id);
        assert_eq!(updated.item_details[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_update_checks_merged_amounts() {
        let db = test_db().await;
        let created = db.tailor().create(&order_input(150_000, 50_000)).await.unwrap();

        let result = db
            .tailor()
            .update(
                &created.order.id,
                TailorOrderPatch {
                    total_paise: Some(40_000),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::AdvanceExceedsTotal { .. }))
        ));

        let unchanged = db.tailor().get(&created.order.id).await.unwrap();
        assert_eq!(unchanged.order.total_paise, 150_000);
    }

    #[tokio::test]
    async fn test_payment_rules_and_freeze() {
        let db = test_db().await;
        let created = db.tailor().create(&order_input(150_000, 50_000)).await.unwrap();
        let id = created.order.id.clone();

        assert!(matches!(
            db.tailor().record_payment(&id, PaymentInput { amount_paise: 40_000 }).await,
            Err(DbError::Domain(CoreError::PartialPayment { .. }))
        ));
        assert!(matches!(
            db.tailor().record_payment(&id, PaymentInput { amount_paise: 120_000 }).await,
            Err(DbError::Domain(CoreError::Overpayment { .. }))
        ));

        let paid = db
            .tailor()
            .record_payment(&id, PaymentInput { amount_paise: 100_000 })
            .await
            .unwrap();
        assert_eq!(paid.order.status, TailorStatus::Delivered);
        assert_eq!(paid.order.balance_paise, 0);
        assert_eq!(paid.order.advance_paise, 150_000);

        let frozen = |r: DbResult<_>| matches!(r, Err(DbError::Domain(CoreError::OrderFrozen { .. })));
        assert!(frozen(
            db.tailor()
                .update(&id, TailorOrderPatch::default())
                .await
                .map(|_| ())
        ));
        assert!(frozen(db.tailor().delete(&id).await.map(|_| ())));
        assert!(frozen(
            db.tailor()
                .delete_item(&paid.item_details[0].id)
                .await
        ));
        assert!(frozen(
            db.tailor()
                .record_payment(&id, PaymentInput { amount_paise: 1 })
                .await
                .map(|_| ())
        ));
    }

    #[tokio::test]
    async fn test_delete_order_and_item() {
        let db = test_db().await;
        let created = db.tailor().create(&order_input(10_000, 0)).await.unwrap();

        db.tailor()
            .delete_item(&created.item_details[1].id)
            .await
            .unwrap();
        assert_eq!(
            db.tailor().get(&created.order.id).await.unwrap().item_details.len(),
            1
        );
        assert!(matches!(
            db.tailor().delete_item("missing").await,
            Err(DbError::NotFound { .. })
        ));

        let number = db.tailor().delete(&created.order.id).await.unwrap();
        assert_eq!(number, created.order.order_number);
        assert!(matches!(
            db.tailor().get(&created.order.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.tailor().delete(&created.order.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deletes_refuse_an_order_delivered_after_it_was_read() {
        let db = test_db().await;
        let created = db.tailor().create(&order_input(10_000, 0)).await.unwrap();
        let id = created.order.id.clone();

        // a payment committed by another request
        sqlx::query(
            "UPDATE tailor_orders SET status = 'delivered', advance_paise = total_paise, balance_paise = 0 WHERE id = ?",
        )
        .bind(&id)
        .execute(db.pool())
        .await
        .unwrap();

        for item in &created.item_details {
            assert!(matches!(
                db.tailor().delete_item(&item.id).await,
                Err(DbError::Domain(CoreError::OrderFrozen { .. }))
            ));
        }
        assert!(matches!(
            db.tailor().delete(&id).await,
            Err(DbError::Domain(CoreError::OrderFrozen { .. }))
        ));

        let kept = db.tailor().get(&id).await.unwrap();
        assert_eq!(kept.order.status, TailorStatus::Delivered);
        assert_eq!(kept.item_details.len(), 2);
    }
}
