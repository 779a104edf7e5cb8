//! Product catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maguva_core::reports::ProductFeatures;
use maguva_core::requests::{ProductInput, ProductPatch};
use maguva_core::Product;
use tracing::info;

use crate::auth::{AuthUser, StaffUser};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::SharedState;

/// `GET /products`
pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().list().await?))
}

/// `GET /products/add/features`
pub async fn features(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> ApiResult<Json<ProductFeatures>> {
    Ok(Json(state.db.products().features().await?))
}

/// `POST /products/add`
pub async fn create(
    StaffUser(auth): StaffUser,
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().create(&input).await?;
    info!(sku = %product.sku, by = %auth.user.email, "Product added");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT|PATCH /products/edit/{id}` and `/products/{id}/`
pub async fn update(
    _staff: StaffUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().update(&id, patch).await?))
}

/// `DELETE /products/{id}`
///
/// Batches and units go with the product; sold lines keep their snapshot.
pub async fn delete(
    StaffUser(auth): StaffUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    info!(product_id = %id, by = %auth.user.email, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
