//! Stock receipts, unit corrections and inventory views.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maguva_core::reports::{
    InventoryGroup, InventoryLookup, ProductInventory, ProductSelectItem, StockBatchView,
    StockReceiptResult,
};
use maguva_core::requests::{StockReceipt, StockReceiptLine};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AuthUser, StaffUser};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: StockReceiptResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub barcode: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchParams {
    pub product: Option<String>,
}

/// `POST /products/add/inventory`
///
/// Body is a list of `{product, size, quantity, batch_id?}` lines for one
/// product. All lines land in one batch, or nothing is written.
pub async fn receive(
    StaffUser(auth): StaffUser,
    State(state): State<SharedState>,
    ApiJson(lines): ApiJson<Vec<StockReceiptLine>>,
) -> ApiResult<(StatusCode, Json<ReceiptResponse>)> {
    let receipt = StockReceipt::from_lines(lines)?;
    let result = state.db.inventory().receive_stock(&receipt).await?;

    info!(
        batch_number = result.batch_number,
        quantity = result.total_quantity,
        by = %auth.user.email,
        "Inventory received"
    );

    Ok((
        StatusCode::CREATED,
        Json(ReceiptResponse {
            message: "Inventory added successfully",
            receipt: result,
        }),
    ))
}

/// `DELETE /products/delete/{id}/inventory`
pub async fn delete_unit(
    _staff: StaffUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.inventory().delete_unit(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /products/{id}/inventory`
pub async fn product_inventory(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductInventory>> {
    Ok(Json(state.db.inventory().product_inventory(&id).await?))
}

/// `GET /inventory`
pub async fn grouped(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<InventoryGroup>>> {
    Ok(Json(state.db.inventory().grouped().await?))
}

/// `GET /inventory/products`
pub async fn product_select(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<ProductSelectItem>>> {
    Ok(Json(state.db.products().select_list().await?))
}

/// `GET /inventory/search/?barcode=…|sku=…`
pub async fn search(
    _auth: AuthUser,
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Json<InventoryLookup>> {
    let lookup = state
        .db
        .inventory()
        .find_by_code(params.barcode.as_deref(), params.sku.as_deref())
        .await?;
    Ok(Json(lookup))
}

/// `GET /stock-batches/?product=…`
pub async fn batches(
    _staff: StaffUser,
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<BatchParams>,
) -> ApiResult<Json<Vec<StockBatchView>>> {
    let product = params.product.as_deref().filter(|p| !p.trim().is_empty());
    Ok(Json(state.db.inventory().batches(product).await?))
}
