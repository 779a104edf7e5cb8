//! Vendor catalog and per-vendor analytics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use maguva_core::reports::VendorAnalytics;
use maguva_core::requests::{VendorInput, VendorPatch};
use maguva_core::Vendor;
use tracing::info;

use crate::auth::{AuthUser, StaffUser};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::SharedState;

/// `GET /vendors/`
pub async fn list(_auth: AuthUser, State(state): State<SharedState>) -> ApiResult<Json<Vec<Vendor>>> {
    Ok(Json(state.db.vendors().list().await?))
}

/// `GET /vendors/{id}/`
pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vendor>> {
    Ok(Json(state.db.vendors().get(&id).await?))
}

/// `POST /vendors/add`
pub async fn create(
    StaffUser(auth): StaffUser,
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<VendorInput>,
) -> ApiResult<(StatusCode, Json<Vendor>)> {
    let vendor = state.db.vendors().create(&input).await?;
    info!(vendor_id = %vendor.id, by = %auth.user.email, "Vendor added");
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// `PUT|PATCH /vendors/{id}/`
pub async fn update(
    _staff: StaffUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<VendorPatch>,
) -> ApiResult<Json<Vendor>> {
    Ok(Json(state.db.vendors().update(&id, patch).await?))
}

/// `GET /vendors/{id}/analytics/`
pub async fn analytics(
    _staff: StaffUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<VendorAnalytics>> {
    let analytics = state
        .db
        .analytics()
        .vendor_analytics(&id, Utc::now(), state.report_offset())
        .await?;
    Ok(Json(analytics))
}
