//! Tailoring orders.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maguva_core::requests::{PaymentInput, TailorOrderInput, TailorOrderPatch};
use maguva_core::TailorOrderWithItems;
use tracing::info;

use super::MessageResponse;
use crate::auth::{AuthUser, StaffUser};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::SharedState;

/// `GET /tailor/orders/`
pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<TailorOrderWithItems>>> {
    Ok(Json(state.db.tailor().list().await?))
}

/// `POST /tailor/orders/add/`
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<TailorOrderInput>,
) -> ApiResult<(StatusCode, Json<TailorOrderWithItems>)> {
    let order = state.db.tailor().create(&input).await?;
    info!(order_number = %order.order.order_number, by = %auth.user.email, "Tailor order added");
    Ok((StatusCode::CREATED, Json(order)))
}

/// `PUT|PATCH /tailor/orders/{id}/update/`
pub async fn update(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<TailorOrderPatch>,
) -> ApiResult<Json<TailorOrderWithItems>> {
    Ok(Json(state.db.tailor().update(&id, patch).await?))
}

/// `PATCH /tailor/orders/{id}/payment/`
pub async fn record_payment(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(payment): ApiJson<PaymentInput>,
) -> ApiResult<Json<TailorOrderWithItems>> {
    let order = state.db.tailor().record_payment(&id, payment).await?;
    info!(
        order_number = %order.order.order_number,
        amount_paise = payment.amount_paise,
        by = %auth.user.email,
        "Tailor payment recorded"
    );
    Ok(Json(order))
}

/// `DELETE /tailor/orders/{id}/delete`
pub async fn delete(
    StaffUser(auth): StaffUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let order_number = state.db.tailor().delete(&id).await?;
    info!(%order_number, by = %auth.user.email, "Tailor order deleted");
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

/// `DELETE /tailor/orders/items/{id}/delete/`
pub async fn delete_item(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.tailor().delete_item(&id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Item {} deleted successfully.",
        id
    ))))
}
