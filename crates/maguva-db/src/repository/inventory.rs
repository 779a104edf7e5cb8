//! # Inventory Repository
//!
//! Stock-in, unit lookups and batch listings.
//!
//! ## Stock Receipt Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /products/add/inventory  [{product, size, quantity, batch_id?}]  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockReceipt::from_lines  (one product, positive lines only)          │
//! │       │                                                                 │
//! │       ▼  BEGIN IMMEDIATE                                                │
//! │  batch_id given?  ── yes ──► batch must belong to the product          │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  INSERT stock_batches (batch_number = MAX + 1, vendor of product)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT inventory × quantity   (fresh SKU + barcode per unit)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  added_qty += n ; stock_count += n                                     │
//! │       │                                                                 │
//! │       ▼  COMMIT                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use maguva_core::codes::{barcode, inventory_sku, CODE_RETRY_ATTEMPTS};
use maguva_core::reports::{
    GroupProduct, InventoryGroup, InventoryLookup, ProductInventory, StockBatchView,
    StockReceiptResult,
};
use maguva_core::requests::StockReceipt;
use maguva_core::{InventoryUnit, Size, StockBatch, ValidationError};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::{begin_write, new_id};
use super::product::ProductRepository;
use super::vendor::VendorRepository;
use crate::error::{DbError, DbResult};

/// Product columns a receipt needs.
#[derive(Debug, FromRow)]
struct ReceiptProduct {
    sku: String,
    color_code: String,
    vendor_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct GroupRow {
    product_id: String,
    product_type: String,
    vendor_name: Option<String>,
    size: Size,
    quantity: i64,
}

#[derive(Debug, FromRow)]
struct BatchRow {
    #[sqlx(flatten)]
    batch: StockBatch,
    product_name: String,
    vendor_name: Option<String>,
}

/// Repository for inventory units and stock batches.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Stock Ledger
    // =========================================================================

    /// Receives stock into a new or existing batch.
    ///
    /// Everything happens in one transaction: a failure on any unit leaves
    /// no batch, no units and no counter change behind. Concurrent receipts
    /// queue on the write lock.
    pub async fn receive_stock(&self, receipt: &StockReceipt) -> DbResult<StockReceiptResult> {
        let mut tx = begin_write(&self.pool).await?;

        let product = sqlx::query_as::<_, ReceiptProduct>(
            "SELECT sku, color_code, vendor_id FROM products WHERE id = ?",
        )
        .bind(&receipt.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", &receipt.product_id))?;

        let (batch_id, batch_number) = match &receipt.batch_id {
            Some(batch_id) => {
                let number: Option<i64> = sqlx::query_scalar(
                    "SELECT batch_number FROM stock_batches WHERE id = ? AND product_id = ?",
                )
                .bind(batch_id)
                .bind(&receipt.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                let number = number.ok_or_else(|| DbError::not_found("Batch", batch_id))?;
                (batch_id.clone(), number)
            }
            None => open_batch(&mut tx, &receipt.product_id, product.vendor_id.as_deref()).await?,
        };

        let now = Utc::now();
        let mut items = Vec::with_capacity(receipt.total_quantity as usize);
        for &(size, quantity) in &receipt.lines {
            for _ in 0..quantity {
                let unit = insert_unit(
                    &mut tx,
                    &receipt.product_id,
                    &batch_id,
                    size,
                    &product,
                    now,
                )
                .await?;
                items.push(unit);
            }
        }

        sqlx::query("UPDATE stock_batches SET added_qty = added_qty + ? WHERE id = ?")
            .bind(receipt.total_quantity)
            .bind(&batch_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE products SET stock_count = stock_count + ?, updated_at = ? WHERE id = ?",
        )
        .bind(receipt.total_quantity)
        .bind(now)
        .bind(&receipt.product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            product_id = %receipt.product_id,
            batch_number,
            quantity = receipt.total_quantity,
            "Stock received"
        );

        Ok(StockReceiptResult {
            batch_id,
            batch_number,
            total_quantity: receipt.total_quantity,
            items,
        })
    }

    /// Removes one unit as a manual correction.
    ///
    /// The three statements are independent atomic updates, not one
    /// transaction. Counters never go below zero and `added_qty` never
    /// drops below `sold_qty`.
    pub async fn delete_unit(&self, id: &str) -> DbResult<()> {
        let unit = self.get_unit(id).await?;

        let deleted = sqlx::query("DELETE FROM inventory WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", id));
        }

        sqlx::query(
            "UPDATE products SET stock_count = MAX(stock_count - 1, 0), updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(&unit.product_id)
        .execute(&self.pool)
        .await?;

        let batch = sqlx::query(
            "UPDATE stock_batches SET added_qty = added_qty - 1 WHERE id = ? AND added_qty > sold_qty",
        )
        .bind(&unit.batch_id)
        .execute(&self.pool)
        .await?;
        if batch.rows_affected() == 0 {
            warn!(batch_id = %unit.batch_id, "Batch counters already exhausted on unit delete");
        }

        info!(inventory_id = %id, sku = %unit.sku, "Inventory unit deleted");
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Gets a unit by id.
    pub async fn get_unit(&self, id: &str) -> DbResult<InventoryUnit> {
        sqlx::query_as::<_, InventoryUnit>("SELECT * FROM inventory WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", id))
    }

    /// Units on hand grouped by product and size.
    pub async fn grouped(&self) -> DbResult<Vec<InventoryGroup>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT p.id AS product_id, p.product_type, v.vendor_name AS vendor_name,
                   i.size, COUNT(*) AS quantity
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            LEFT JOIN vendors v ON v.id = p.vendor_id
            GROUP BY p.id, i.size
            ORDER BY p.product_type, p.id, i.size
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InventoryGroup {
                product: GroupProduct {
                    id: row.product_id,
                    product_type: row.product_type,
                    vendor_name: row.vendor_name,
                },
                size: row.size.display_code().to_string(),
                quantity: row.quantity,
            })
            .collect())
    }

    /// Finds a unit by barcode (preferred) or SKU.
    pub async fn find_by_code(
        &self,
        barcode: Option<&str>,
        sku: Option<&str>,
    ) -> DbResult<InventoryLookup> {
        let barcode = barcode.map(str::trim).filter(|c| !c.is_empty());
        let sku = sku.map(str::trim).filter(|c| !c.is_empty());

        let (column, code) = match (barcode, sku) {
            (Some(code), _) => ("barcode", code),
            (None, Some(code)) => ("sku", code),
            (None, None) => {
                return Err(ValidationError::Required {
                    field: "barcode or sku".to_string(),
                }
                .into())
            }
        };

        debug!(column, code, "Inventory lookup");
        let sql = format!("SELECT * FROM inventory WHERE {column} = ?");
        let inventory = sqlx::query_as::<_, InventoryUnit>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", code))?;

        let product = ProductRepository::new(self.pool.clone())
            .get(&inventory.product_id)
            .await?;

        Ok(InventoryLookup { inventory, product })
    }

    /// A product with its vendor and every unit on the shelf.
    pub async fn product_inventory(&self, product_id: &str) -> DbResult<ProductInventory> {
        let product = ProductRepository::new(self.pool.clone())
            .get(product_id)
            .await?;

        let vendor = match product.vendor_id.as_deref() {
            Some(vendor_id) => Some(VendorRepository::new(self.pool.clone()).get(vendor_id).await?),
            None => None,
        };

        let inventory = sqlx::query_as::<_, InventoryUnit>(
            "SELECT * FROM inventory WHERE product_id = ? ORDER BY created_at, sku",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductInventory {
            product,
            vendor,
            inventory,
        })
    }

    /// Stock batches, optionally for one product.
    pub async fn batches(&self, product_id: Option<&str>) -> DbResult<Vec<StockBatchView>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT b.id, b.product_id, b.vendor_id, b.batch_number, b.added_qty, b.sold_qty,
                   b.created_at, p.product_type AS product_name, v.vendor_name AS vendor_name
            FROM stock_batches b
            JOIN products p ON p.id = b.product_id
            LEFT JOIN vendors v ON v.id = b.vendor_id
            WHERE (?1 IS NULL OR b.product_id = ?1)
            ORDER BY p.product_type, b.product_id, b.batch_number
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StockBatchView::new(row.batch, row.product_name, row.vendor_name))
            .collect())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Opens the next batch of a product. Returns `(id, batch_number)`.
async fn open_batch(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    vendor_id: Option<&str>,
) -> DbResult<(String, i64)> {
    let batch_number: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(batch_number), 0) + 1 FROM stock_batches WHERE product_id = ?",
    )
    .bind(product_id)
    .fetch_one(&mut **tx)
    .await?;

    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO stock_batches (id, product_id, vendor_id, batch_number, added_qty, sold_qty, created_at)
        VALUES (?, ?, ?, ?, 0, 0, ?)
        "#,
    )
    .bind(&id)
    .bind(product_id)
    .bind(vendor_id)
    .bind(batch_number)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    debug!(product_id, batch_number, "Stock batch opened");
    Ok((id, batch_number))
}

/// Inserts one unit, regenerating its codes on a unique collision.
async fn insert_unit(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    batch_id: &str,
    size: Size,
    product: &ReceiptProduct,
    now: chrono::DateTime<Utc>,
) -> DbResult<InventoryUnit> {
    for attempt in 1..=CODE_RETRY_ATTEMPTS {
        let unit = {
            let mut rng = rand::thread_rng();
            InventoryUnit {
                id: new_id(),
                product_id: product_id.to_string(),
                batch_id: batch_id.to_string(),
                size,
                sku: inventory_sku(&mut rng, &product.sku, size, &product.color_code),
                barcode: barcode(&mut rng),
                created_at: now,
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO inventory (id, product_id, batch_id, size, sku, barcode, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.product_id)
        .bind(&unit.batch_id)
        .bind(unit.size)
        .bind(&unit.sku)
        .bind(&unit.barcode)
        .bind(unit.created_at)
        .execute(&mut **tx)
        .await;

        match result.map_err(DbError::from) {
            Ok(_) => return Ok(unit),
            Err(e)
                if e.is_unique_violation_on("inventory.sku")
                    || e.is_unique_violation_on("inventory.barcode") =>
            {
                warn!(attempt, "Inventory code collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(DbError::Internal(
        "Could not generate unique inventory codes".to_string(),
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{file_db, receipt, seed_product, seed_vendor, test_db};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_receive_new_batch() {
        let db = test_db().await;
        let vendor = seed_vendor(&db, "Anand Silks").await;
        let product = seed_product(&db, Some(&vendor.id)).await;

        let result = db
            .inventory()
            .receive_stock(&receipt(&product.id, &[(Size::Medium, 5)], None))
            .await
            .unwrap();

        assert_eq!(result.batch_number, 1);
        assert_eq!(result.total_quantity, 5);
        assert_eq!(result.items.len(), 5);
        let skus: HashSet<_> = result.items.iter().map(|u| u.sku.clone()).collect();
        let barcodes: HashSet<_> = result.items.iter().map(|u| u.barcode.clone()).collect();
        assert_eq!(skus.len(), 5);
        assert_eq!(barcodes.len(), 5);
        assert!(result.items[0].sku.starts_with(&format!("{}-M-FF5733-", product.sku)));

        let stored = db.products().get(&product.id).await.unwrap();
        assert_eq!(stored.stock_count, 5);

        let batches = db.inventory().batches(Some(&product.id)).await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch.added_qty, 5);
        assert_eq!(batches[0].batch.vendor_id.as_deref(), Some(vendor.id.as_str()));
        assert_eq!(batches[0].label, "Unit 1");
        assert_eq!(batches[0].vendor_name.as_deref(), Some("Anand Silks"));
    }

    #[tokio::test]
    async fn test_next_batch_and_top_up() {
        let db = test_db().await;
        let product = seed_product(&db, None).await;
        let inventory = db.inventory();

        let first = inventory
            .receive_stock(&receipt(&product.id, &[(Size::Small, 2)], None))
            .await
            .unwrap();
        let second = inventory
            .receive_stock(&receipt(&product.id, &[(Size::Large, 1), (Size::NoSize, 2)], None))
            .await
            .unwrap();
        assert_eq!(second.batch_number, 2);
        assert_eq!(second.total_quantity, 3);

        let topped = inventory
            .receive_stock(&receipt(&product.id, &[(Size::Small, 3)], Some(&first.batch_id)))
            .await
            .unwrap();
        assert_eq!(topped.batch_id, first.batch_id);
        assert_eq!(topped.batch_number, 1);

        let batches = inventory.batches(Some(&product.id)).await.unwrap();
        assert_eq!(batches[0].batch.added_qty, 5);
        assert_eq!(batches[1].batch.added_qty, 3);
        assert_eq!(db.products().get(&product.id).await.unwrap().stock_count, 8);

        let groups = inventory.grouped().await.unwrap();
        let none = groups.iter().find(|g| g.size == "NONE").unwrap();
        assert_eq!(none.quantity, 2);
        let small = groups.iter().find(|g| g.size == "S").unwrap();
        assert_eq!(small.quantity, 5);
    }

    #[tokio::test]
    async fn test_foreign_batch_is_rejected_without_side_effects() {
        let db = test_db().await;
        let product = seed_product(&db, None).await;
        let other = seed_product(&db, None).await;

        let other_batch = db
            .inventory()
            .receive_stock(&receipt(&other.id, &[(Size::Medium, 1)], None))
            .await
            .unwrap();

        let result = db
            .inventory()
            .receive_stock(&receipt(&product.id, &[(Size::Medium, 4)], Some(&other_batch.batch_id)))
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));

        assert_eq!(db.products().get(&product.id).await.unwrap().stock_count, 0);
        assert!(db
            .inventory()
            .product_inventory(&product.id)
            .await
            .unwrap()
            .inventory
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = test_db().await;
        let result = db
            .inventory()
            .receive_stock(&receipt(
                "550e8400-e29b-41d4-a716-446655440000",
                &[(Size::Medium, 1)],
                None,
            ))
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_lookup_and_delete_unit() {
        let db = test_db().await;
        let product = seed_product(&db, None).await;
        let received = db
            .inventory()
            .receive_stock(&receipt(&product.id, &[(Size::ExtraLarge, 2)], None))
            .await
            .unwrap();
        let unit = &received.items[0];

        let by_barcode = db
            .inventory()
            .find_by_code(Some(&unit.barcode), None)
            .await
            .unwrap();
        assert_eq!(by_barcode.inventory.id, unit.id);
        assert_eq!(by_barcode.product.id, product.id);

        let by_sku = db.inventory().find_by_code(None, Some(&unit.sku)).await.unwrap();
        assert_eq!(by_sku.inventory.id, unit.id);

        assert!(matches!(
            db.inventory().find_by_code(None, None).await,
            Err(DbError::Domain(_))
        ));
        assert!(matches!(
            db.inventory().find_by_code(Some("BC-0000000000"), None).await,
            Err(DbError::NotFound { .. })
        ));

        db.inventory().delete_unit(&unit.id).await.unwrap();
        assert_eq!(db.products().get(&product.id).await.unwrap().stock_count, 1);
        let batches = db.inventory().batches(None).await.unwrap();
        assert_eq!(batches[0].batch.added_qty, 1);
        assert!(matches!(
            db.inventory().delete_unit(&unit.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_receipts_all_land() {
        let scratch = file_db().await;
        let db = scratch.db.clone();
        let product = seed_product(&db, None).await;

        let mut handles = Vec::new();
        for _ in 0..6 {
            let db = db.clone();
            let receipt = receipt(&product.id, &[(Size::Medium, 4)], None);
            handles.push(tokio::spawn(async move {
                db.inventory().receive_stock(&receipt).await
            }));
        }

        let mut numbers = HashSet::new();
        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.items.len(), 4);
            numbers.insert(result.batch_number);
        }
        assert_eq!(numbers, (1..=6).collect::<HashSet<i64>>());

        let batches = db.inventory().batches(Some(&product.id)).await.unwrap();
        let added: i64 = batches.iter().map(|b| b.batch.added_qty).sum();
        assert_eq!(added, 24);
        assert_eq!(db.products().get(&product.id).await.unwrap().stock_count, 24);
    }
}
