//! # Request Shapes
//!
//! Input payloads for every mutating operation, with their `validate()`
//! rules. Handlers deserialize into these, validate, then hand them to the
//! repositories.
//!
//! ## Create vs Patch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  *Input  ─ every required field present, validated as a whole          │
//! │  *Patch  ─ every field optional; merged onto the stored row, and the   │
//! │            merged result is validated with the same rules as *Input    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::decimal;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{derive_mrp, SaleLine};
use crate::tailoring;
use crate::types::{FabricType, MarkupType, PaymentMethod, Product, ProductType, Size, Vendor};
use crate::validation::{
    validate_color_code, validate_email, validate_max_len, validate_non_negative_paise,
    validate_percentage_bps, validate_phone, validate_positive_paise, validate_quantity,
    validate_required, validate_uuid,
};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_LINES};

// =============================================================================
// Accounts
// =============================================================================

/// Email/password login.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Vendors
// =============================================================================

/// A new vendor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VendorInput {
    pub vendor_name: String,
    pub contact_person_name: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl VendorInput {
    pub fn validate(&self) -> CoreResult<()> {
        validate_required("vendor_name", &self.vendor_name, 255)?;
        validate_required("contact_person_name", &self.contact_person_name, 255)?;
        validate_phone("phone", &self.phone, true)?;
        validate_email("email", &self.email)?;
        validate_required("street", &self.street, 255)?;
        validate_required("city", &self.city, 100)?;
        validate_required("state", &self.state, 100)?;
        validate_required("zip_code", &self.zip_code, 20)?;
        validate_required("country", &self.country, 100)?;
        Ok(())
    }
}

/// Partial vendor update.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct VendorPatch {
    pub vendor_name: Option<String>,
    pub contact_person_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl VendorPatch {
    /// Merges the patch onto the stored vendor and validates the result.
    pub fn merge(self, current: &Vendor) -> CoreResult<VendorInput> {
        let merged = VendorInput {
            vendor_name: self.vendor_name.unwrap_or_else(|| current.vendor_name.clone()),
            contact_person_name: self
                .contact_person_name
                .unwrap_or_else(|| current.contact_person_name.clone()),
            phone: self.phone.unwrap_or_else(|| current.phone.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            street: self.street.unwrap_or_else(|| current.street.clone()),
            city: self.city.unwrap_or_else(|| current.city.clone()),
            state: self.state.unwrap_or_else(|| current.state.clone()),
            zip_code: self.zip_code.unwrap_or_else(|| current.zip_code.clone()),
            country: self.country.unwrap_or_else(|| current.country.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }
}

// =============================================================================
// Products
// =============================================================================

/// A new product. SKU and stock count are never client-supplied.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    #[serde(default)]
    pub vendor_id: Option<String>,
    pub product_type: ProductType,
    pub fabric_type: FabricType,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub color_code: String,
    #[serde(rename = "base_price", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub base_price_paise: i64,
    #[serde(default)]
    pub markup_type: MarkupType,
    /// Rupees for fixed markup, percent for percent markup; hundredths inside.
    #[serde(rename = "markup_price", default, with = "decimal::rupees")]
    #[ts(type = "number")]
    pub markup_value: i64,
    #[serde(rename = "discount_percentage", default, with = "decimal::percent")]
    #[ts(type = "number")]
    pub discount_bps: u32,
}

impl ProductInput {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(vendor_id) = &self.vendor_id {
            validate_uuid("vendor_id", vendor_id)?;
        }
        if let Some(sub_category) = &self.sub_category {
            validate_max_len("sub_category", sub_category, 100)?;
        }
        validate_color_code(&self.color_code)?;
        validate_positive_paise("base_price", self.base_price_paise)?;
        validate_non_negative_paise("markup_price", self.markup_value)?;
        if self.markup_type == MarkupType::Percent && self.markup_value > u32::MAX as i64 {
            return Err(ValidationError::OutOfRange {
                field: "markup_price".to_string(),
                min: 0,
                max: u32::MAX as i64,
            }
            .into());
        }
        validate_percentage_bps("discount_percentage", self.discount_bps)?;
        validate_non_negative_paise("mrp", self.mrp().paise())?;
        Ok(())
    }

    /// MRP derived from base price and markup.
    pub fn mrp(&self) -> Money {
        derive_mrp(
            Money::from_paise(self.base_price_paise),
            self.markup_type,
            self.markup_value,
        )
    }
}

/// Partial product update.
///
/// `vendor_id: Some("")` detaches the product from its vendor.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    pub vendor_id: Option<String>,
    pub product_type: Option<ProductType>,
    pub fabric_type: Option<FabricType>,
    pub sub_category: Option<String>,
    pub color_code: Option<String>,
    #[serde(rename = "base_price", default, with = "decimal::rupees_opt")]
    #[ts(type = "number | null")]
    pub base_price_paise: Option<i64>,
    pub markup_type: Option<MarkupType>,
    #[serde(rename = "markup_price", default, with = "decimal::rupees_opt")]
    #[ts(type = "number | null")]
    pub markup_value: Option<i64>,
    #[serde(rename = "discount_percentage", default, with = "decimal::percent_opt")]
    #[ts(type = "number | null")]
    pub discount_bps: Option<u32>,
}

impl ProductPatch {
    /// Merges the patch onto the stored product and validates the result.
    pub fn merge(self, current: &Product) -> CoreResult<ProductInput> {
        let vendor_id = match self.vendor_id {
            Some(id) if id.trim().is_empty() => None,
            Some(id) => Some(id),
            None => current.vendor_id.clone(),
        };

        let sub_category = match self.sub_category {
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(s),
            None => current.sub_category.clone(),
        };

        let merged = ProductInput {
            vendor_id,
            product_type: self.product_type.unwrap_or(current.product_type),
            fabric_type: self.fabric_type.unwrap_or(current.fabric_type),
            sub_category,
            color_code: self.color_code.unwrap_or_else(|| current.color_code.clone()),
            base_price_paise: self.base_price_paise.unwrap_or(current.base_price_paise),
            markup_type: self.markup_type.unwrap_or(current.markup_type),
            markup_value: self.markup_value.unwrap_or(current.markup_value),
            discount_bps: self.discount_bps.unwrap_or(current.discount_bps),
        };
        merged.validate()?;
        Ok(merged)
    }
}

// =============================================================================
// Stock Receipt
// =============================================================================

/// One line of a stock-in request: `quantity` units of `size`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReceiptLine {
    pub product: String,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub batch_id: Option<String>,
}

/// A validated stock receipt for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReceipt {
    pub product_id: String,
    /// Existing batch to top up, or `None` to open the next batch.
    pub batch_id: Option<String>,
    /// Only lines with a positive quantity.
    pub lines: Vec<(Size, i64)>,
    pub total_quantity: i64,
}

impl StockReceipt {
    /// Builds a receipt from raw lines.
    ///
    /// ## Rules
    /// - At least one line, every line naming the same product
    /// - Batch ids, when given, must agree
    /// - Lines with quantity ≤ 0 are skipped; at least one must remain
    /// - A single line may not exceed `MAX_ITEM_QUANTITY`
    pub fn from_lines(lines: Vec<StockReceiptLine>) -> CoreResult<Self> {
        let first = lines.first().ok_or_else(|| ValidationError::Empty {
            item: "inventory item".to_string(),
        })?;

        let product_id = first.product.trim().to_string();
        validate_uuid("product", &product_id)?;

        let mut batch_id: Option<String> = None;
        let mut kept = Vec::new();
        let mut total_quantity = 0;

        for line in &lines {
            if line.product.trim() != product_id {
                return Err(ValidationError::Inconsistent {
                    field: "product".to_string(),
                }
                .into());
            }

            if let Some(id) = line.batch_id.as_deref().filter(|id| !id.trim().is_empty()) {
                match &batch_id {
                    Some(existing) if existing != id => {
                        return Err(ValidationError::Inconsistent {
                            field: "batch_id".to_string(),
                        }
                        .into());
                    }
                    Some(_) => {}
                    None => batch_id = Some(id.to_string()),
                }
            }

            if line.quantity <= 0 {
                continue;
            }
            if line.quantity > MAX_ITEM_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: MAX_ITEM_QUANTITY,
                }
                .into());
            }

            total_quantity += line.quantity;
            kept.push((line.size, line.quantity));
        }

        if kept.is_empty() {
            return Err(ValidationError::Empty {
                item: "inventory item with a positive quantity".to_string(),
            }
            .into());
        }

        Ok(StockReceipt {
            product_id,
            batch_id,
            lines: kept,
            total_quantity,
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Customer block of a sale. Both fields may be blank for walk-ins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
}

/// Tender block of a sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentTender {
    #[serde(default)]
    pub method: PaymentMethod,
    #[serde(rename = "amount", default, with = "decimal::rupees")]
    #[ts(type = "number")]
    pub amount_paise: i64,
}

/// One line of a sale, pointing at a physical unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineInput {
    #[serde(rename = "inventoryId")]
    pub inventory_id: String,
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "price", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub price_paise: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(rename = "discount", default, with = "decimal::percent")]
    #[ts(type = "number")]
    pub discount_bps: u32,
}

impl SaleLineInput {
    pub fn as_sale_line(&self) -> SaleLine {
        SaleLine {
            price: Money::from_paise(self.price_paise),
            quantity: self.quantity,
            discount_bps: self.discount_bps,
        }
    }
}

/// A POS sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    #[serde(default)]
    pub customer: CustomerInput,
    #[serde(default)]
    pub payment: PaymentTender,
    pub items: Vec<SaleLineInput>,
}

impl SaleRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(ValidationError::Empty {
                item: "item".to_string(),
            }
            .into());
        }
        if self.items.len() > MAX_SALE_LINES {
            return Err(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_SALE_LINES as i64,
            }
            .into());
        }

        validate_max_len("customer_name", &self.customer.name, 255)?;
        validate_phone("customer_mobile", &self.customer.mobile, false)?;
        validate_non_negative_paise("payment_amount", self.payment.amount_paise)?;

        for item in &self.items {
            validate_uuid("inventoryId", &item.inventory_id)?;
            validate_uuid("productId", &item.product_id)?;
            validate_quantity(item.quantity)?;
            validate_non_negative_paise("price", item.price_paise)?;
            validate_percentage_bps("discount", item.discount_bps)?;
        }

        Ok(())
    }

    pub fn sale_lines(&self) -> Vec<SaleLine> {
        self.items.iter().map(SaleLineInput::as_sale_line).collect()
    }
}

fn default_quantity() -> i64 {
    1
}

// =============================================================================
// Tailoring
// =============================================================================

/// A garment line of a new tailoring order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TailorItemInput {
    pub item_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl TailorItemInput {
    pub fn validate(&self) -> CoreResult<()> {
        validate_required("item_name", &self.item_name, 255)?;
        validate_quantity(self.quantity)?;
        Ok(())
    }
}

/// A new tailoring order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TailorOrderInput {
    pub customer_name: String,
    pub customer_mobile: String,
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[ts(as = "String")]
    pub delivery_date: NaiveDate,
    /// Defaults to now.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(rename = "total_amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub total_paise: i64,
    #[serde(rename = "advance_paid", default, with = "decimal::rupees")]
    #[ts(type = "number")]
    pub advance_paise: i64,
    #[serde(default)]
    pub item_details: Vec<TailorItemInput>,
}

impl TailorOrderInput {
    pub fn validate(&self) -> CoreResult<()> {
        validate_required("customer_name", &self.customer_name, 255)?;
        validate_phone("customer_mobile", &self.customer_mobile, true)?;
        validate_required("product_name", &self.product_name, 255)?;
        tailoring::validate_amounts(
            Money::from_paise(self.total_paise),
            Money::from_paise(self.advance_paise),
        )?;
        tailoring::validate_item_count(self.item_details.len())?;
        for item in &self.item_details {
            item.validate()?;
        }
        Ok(())
    }
}

/// A garment line in an update: with `id` it edits, without it creates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TailorItemPatch {
    #[serde(default)]
    pub id: Option<String>,
    pub item_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Partial update of a tailoring order.
///
/// `item_details: None` leaves the items untouched; `Some(list)` replaces
/// them (matched by id, new ones created, unmentioned ones deleted).
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct TailorOrderPatch {
    pub customer_name: Option<String>,
    pub customer_mobile: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(rename = "total_amount", default, with = "decimal::rupees_opt")]
    #[ts(type = "number | null")]
    pub total_paise: Option<i64>,
    #[serde(rename = "advance_paid", default, with = "decimal::rupees_opt")]
    #[ts(type = "number | null")]
    pub advance_paise: Option<i64>,
    pub item_details: Option<Vec<TailorItemPatch>>,
}

impl TailorOrderPatch {
    /// Field checks that don't need the stored order.
    pub fn validate_fields(&self) -> CoreResult<()> {
        if let Some(name) = &self.customer_name {
            validate_required("customer_name", name, 255)?;
        }
        if let Some(mobile) = &self.customer_mobile {
            validate_phone("customer_mobile", mobile, true)?;
        }
        if let Some(product) = &self.product_name {
            validate_required("product_name", product, 255)?;
        }
        if let Some(items) = &self.item_details {
            tailoring::validate_item_count(items.len())?;
            for item in items {
                validate_required("item_name", &item.item_name, 255)?;
                validate_quantity(item.quantity)?;
            }
        }
        Ok(())
    }
}

/// A payment against a tailoring order.
#[derive(Debug, Clone, Copy, Deserialize, TS)]
#[ts(export)]
pub struct PaymentInput {
    #[serde(rename = "amount", with = "decimal::rupees")]
    #[ts(type = "number")]
    pub amount_paise: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
