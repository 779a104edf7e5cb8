//! # Repository Module
//!
//! Database repository implementations for the back-office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │  db.inventory().receive_stock(&receipt)                         │
//! │       ▼                                                                 │
//! │  InventoryRepository                                                    │
//! │  ├── receive_stock   (one transaction)                                  │
//! │  ├── delete_unit     (independent atomic updates)                       │
//! │  └── find_by_code / grouped / batches ...                               │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Counter Discipline
//! `products.stock_count`, `stock_batches.added_qty` and
//! `stock_batches.sold_qty` are never read-modified-written. Every change is
//! one `UPDATE … SET x = x ± n` statement, guarded in its WHERE clause when
//! an invariant could be broken.
//!
//! ## Write Transactions
//! Multi-statement writes open with `BEGIN IMMEDIATE` (see [`begin_write`]).
//! The write lock is taken at BEGIN, so a second writer waits on the busy
//! timeout instead of failing with `database is locked` when a deferred
//! read lock cannot be upgraded.
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts and password checks
//! - [`vendor::VendorRepository`] - Vendor CRUD
//! - [`product::ProductRepository`] - Product CRUD, dropdown metadata
//! - [`inventory::InventoryRepository`] - Stock-in, unit lookups, batches
//! - [`order::OrderRepository`] - POS sales
//! - [`tailor::TailorRepository`] - Tailoring orders
//! - [`analytics::AnalyticsRepository`] - Dashboard and vendor analytics
//! - [`report::ReportRepository`] - Daily report

pub mod analytics;
pub mod inventory;
pub mod order;
pub mod product;
pub mod report;
pub mod tailor;
pub mod user;
pub mod vendor;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbResult;

/// Fresh UUID v4 primary key.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Starts a transaction holding the write lock from its first statement.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use maguva_core::requests::{ProductInput, StockReceipt, StockReceiptLine, VendorInput};
    use maguva_core::{FabricType, MarkupType, Product, ProductType, Size, Vendor};

    use std::path::PathBuf;

    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File-backed database with a real connection pool, removed on drop.
    pub struct FileDb {
        pub db: Database,
        path: PathBuf,
    }

    impl Drop for FileDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }

    pub async fn file_db() -> FileDb {
        let path = std::env::temp_dir().join(format!("maguva-test-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(path.clone()).max_connections(8))
            .await
            .unwrap();
        FileDb { db, path }
    }

    pub fn vendor_input(name: &str) -> VendorInput {
        VendorInput {
            vendor_name: name.to_string(),
            contact_person_name: "Ravi Kumar".to_string(),
            phone: "9876543210".to_string(),
            email: "ravi@example.com".to_string(),
            street: "12 Market Road".to_string(),
            city: "Hyderabad".to_string(),
            state: "Telangana".to_string(),
            zip_code: "500001".to_string(),
            country: "India".to_string(),
        }
    }

    pub fn product_input(vendor_id: Option<&str>, base_price_paise: i64) -> ProductInput {
        ProductInput {
            vendor_id: vendor_id.map(str::to_string),
            product_type: ProductType::Kurti,
            fabric_type: FabricType::Cotton,
            sub_category: None,
            color_code: "#FF5733".to_string(),
            base_price_paise,
            markup_type: MarkupType::Fixed,
            markup_value: 20_000,
            discount_bps: 0,
        }
    }

    pub async fn seed_vendor(db: &Database, name: &str) -> Vendor {
        db.vendors().create(&vendor_input(name)).await.unwrap()
    }

    pub async fn seed_product(db: &Database, vendor_id: Option<&str>) -> Product {
        db.products()
            .create(&product_input(vendor_id, 60_000))
            .await
            .unwrap()
    }

    pub fn receipt(product_id: &str, lines: &[(Size, i64)], batch_id: Option<&str>) -> StockReceipt {
        StockReceipt::from_lines(
            lines
                .iter()
                .map(|(size, quantity)| StockReceiptLine {
                    product: product_id.to_string(),
                    size: *size,
                    quantity: *quantity,
                    batch_id: batch_id.map(str::to_string),
                })
                .collect(),
        )
        .unwrap()
    }
}
