//! POS sales.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use maguva_core::requests::SaleRequest;
use maguva_core::OrderWithItems;
use serde::Serialize;
use tracing::info;

use crate::auth::{AuthUser, StaffUser};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub message: &'static str,
    pub order_number: String,
    pub order_data: OrderWithItems,
}

/// `POST /transactions/create`
///
/// Prices the sale, consumes every listed unit and writes the order in one
/// transaction.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<SaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleResponse>)> {
    let order = state
        .db
        .orders()
        .create_sale(&request, Some(&auth.user))
        .await?;

    info!(
        order_number = %order.order.order_number,
        lines = order.items.len(),
        by = %auth.user.email,
        "Sale recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaleResponse {
            message: "Order created successfully",
            order_number: order.order.order_number.clone(),
            order_data: order,
        }),
    ))
}

/// `GET /transactions/list`
pub async fn list(
    _staff: StaffUser,
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<OrderWithItems>>> {
    Ok(Json(state.db.orders().list().await?))
}
