//! # Vendor Repository
//!
//! Database operations for vendors (suppliers).

use chrono::Utc;
use maguva_core::requests::{VendorInput, VendorPatch};
use maguva_core::Vendor;
use sqlx::SqlitePool;
use tracing::info;

use super::new_id;
use crate::error::{DbError, DbResult};

/// Repository for vendor database operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
}

impl VendorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VendorRepository { pool }
    }

    /// Lists every vendor alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT * FROM vendors ORDER BY vendor_name COLLATE NOCASE, created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    /// Gets a vendor by id.
    pub async fn get(&self, id: &str) -> DbResult<Vendor> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Vendor", id))
    }

    /// Creates a vendor.
    pub async fn create(&self, input: &VendorInput) -> DbResult<Vendor> {
        input.validate()?;

        let now = Utc::now();
        let vendor = Vendor {
            id: new_id(),
            vendor_name: input.vendor_name.trim().to_string(),
            contact_person_name: input.contact_person_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            street: input.street.trim().to_string(),
            city: input.city.trim().to_string(),
            state: input.state.trim().to_string(),
            zip_code: input.zip_code.trim().to_string(),
            country: input.country.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO vendors (
                id, vendor_name, contact_person_name, phone, email,
                street, city, state, zip_code, country, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vendor.id)
        .bind(&vendor.vendor_name)
        .bind(&vendor.contact_person_name)
        .bind(&vendor.phone)
        .bind(&vendor.email)
        .bind(&vendor.street)
        .bind(&vendor.city)
        .bind(&vendor.state)
        .bind(&vendor.zip_code)
        .bind(&vendor.country)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .execute(&self.pool)
        .await?;

        info!(vendor_id = %vendor.id, vendor_name = %vendor.vendor_name, "Vendor created");
        Ok(vendor)
    }

    /// Applies a partial update and returns the stored vendor.
    pub async fn update(&self, id: &str, patch: VendorPatch) -> DbResult<Vendor> {
        let current = self.get(id).await?;
        let merged = patch.merge(&current)?;

        sqlx::query(
            r#"
            UPDATE vendors SET
                vendor_name = ?, contact_person_name = ?, phone = ?, email = ?,
                street = ?, city = ?, state = ?, zip_code = ?, country = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(merged.vendor_name.trim())
        .bind(merged.contact_person_name.trim())
        .bind(merged.phone.trim())
        .bind(merged.email.trim())
        .bind(merged.street.trim())
        .bind(merged.city.trim())
        .bind(merged.state.trim())
        .bind(merged.zip_code.trim())
        .bind(merged.country.trim())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        info!(vendor_id = %id, "Vendor updated");
        self.get(id).await
    }
}

// =============================================================================
// Tests
// =============================================================================
