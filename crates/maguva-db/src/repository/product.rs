//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with vendor name joined for display
//! - SKU generation with retry on collision
//! - MRP derivation on every write
//! - Dropdown metadata for the add-product form
//!
//! `stock_count` is never written here. It belongs to the stock ledger
//! (see `inventory` and `order`).

use chrono::Utc;
use maguva_core::codes::{product_sku, CODE_RETRY_ATTEMPTS};
use maguva_core::reports::{ChoiceOption, ProductFeatures, ProductSelectItem};
use maguva_core::requests::{ProductInput, ProductPatch};
use maguva_core::{FabricType, Product, ProductType};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::new_id;
use crate::error::{DbError, DbResult};

/// Product columns plus the joined vendor name.
pub(crate) const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.vendor_id, v.vendor_name AS vendor_name, p.product_type, p.fabric_type,
           p.sub_category, p.color_code, p.base_price_paise, p.markup_type, p.markup_value,
           p.mrp_paise, p.discount_bps, p.sku, p.stock_count, p.created_at, p.updated_at
    FROM products p
    LEFT JOIN vendors v ON v.id = p.vendor_id
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.created_at DESC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Gets a product by id.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Creates a product with a generated SKU and derived MRP.
    ///
    /// ## SKU Collisions
    /// `<TYPE3>-<4 digits>` has 10,000 values per type, so collisions are
    /// real. The insert is retried with a fresh SKU up to
    /// `CODE_RETRY_ATTEMPTS` times.
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        input.validate()?;
        self.ensure_vendor(input.vendor_id.as_deref()).await?;

        let id = new_id();
        let now = Utc::now();
        let mrp = input.mrp();

        for attempt in 1..=CODE_RETRY_ATTEMPTS {
            let sku = product_sku(&mut rand::thread_rng(), input.product_type);

            let result = sqlx::query(
                r#"
                INSERT INTO products (
                    id, vendor_id, product_type, fabric_type, sub_category, color_code,
                    base_price_paise, markup_type, markup_value, mrp_paise, discount_bps,
                    sku, stock_count, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&input.vendor_id)
            .bind(input.product_type)
            .bind(input.fabric_type)
            .bind(&input.sub_category)
            .bind(input.color_code.to_uppercase())
            .bind(input.base_price_paise)
            .bind(input.markup_type)
            .bind(input.markup_value)
            .bind(mrp.paise())
            .bind(input.discount_bps)
            .bind(&sku)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await;

            match result.map_err(DbError::from) {
                Ok(_) => {
                    info!(product_id = %id, sku = %sku, "Product created");
                    return self.get(&id).await;
                }
                Err(e) if e.is_unique_violation_on("products.sku") => {
                    warn!(sku = %sku, attempt, "Product SKU collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::Internal(
            "Could not generate a unique product SKU".to_string(),
        ))
    }

    /// Applies a partial update. MRP is re-derived; SKU and stock stay.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        let current = self.get(id).await?;
        let merged = patch.merge(&current)?;
        self.ensure_vendor(merged.vendor_id.as_deref()).await?;

        sqlx::query(
            r#"
            UPDATE products SET
                vendor_id = ?, product_type = ?, fabric_type = ?, sub_category = ?,
                color_code = ?, base_price_paise = ?, markup_type = ?, markup_value = ?,
                mrp_paise = ?, discount_bps = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&merged.vendor_id)
        .bind(merged.product_type)
        .bind(merged.fabric_type)
        .bind(&merged.sub_category)
        .bind(merged.color_code.to_uppercase())
        .bind(merged.base_price_paise)
        .bind(merged.markup_type)
        .bind(merged.markup_value)
        .bind(merged.mrp().paise())
        .bind(merged.discount_bps)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        info!(product_id = %id, "Product updated");
        self.get(id).await
    }

    /// Deletes a product with its batches and units.
    ///
    /// Order lines keep their snapshot; their batch reference becomes null.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Vendors and enum choices for the add-product form.
    pub async fn features(&self) -> DbResult<ProductFeatures> {
        let vendors = sqlx::query_as::<_, maguva_core::Vendor>(
            "SELECT * FROM vendors ORDER BY vendor_name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductFeatures {
            vendors,
            product_types: ProductType::ALL
                .iter()
                .map(|t| ChoiceOption::same(t.as_str()))
                .collect(),
            fabric_types: FabricType::ALL
                .iter()
                .map(|f| ChoiceOption::same(f.as_str()))
                .collect(),
        })
    }

    /// Compact list for the inventory product picker.
    pub async fn select_list(&self) -> DbResult<Vec<ProductSelectItem>> {
        let items = sqlx::query_as::<_, ProductSelectItem>(
            r#"
            SELECT p.id, p.product_type, v.vendor_name AS vendor_name
            FROM products p
            LEFT JOIN vendors v ON v.id = p.vendor_id
            ORDER BY p.product_type, p.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn ensure_vendor(&self, vendor_id: Option<&str>) -> DbResult<()> {
        let Some(vendor_id) = vendor_id else {
            return Ok(());
        };

        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM vendors WHERE id = ?")
            .bind(vendor_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            debug!(vendor_id, "Unknown vendor on product write");
            return Err(DbError::not_found("Vendor", vendor_id));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
