//! Dashboard analytics.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use maguva_core::analytics::DEFAULT_WINDOW_DAYS;
use maguva_core::reports::DashboardAnalytics;
use serde::Deserialize;

use crate::auth::StaffUser;
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub days: Option<i64>,
}

/// `GET /dashboard/analytics/?days=N`
pub async fn analytics(
    _staff: StaffUser,
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<DashboardParams>,
) -> ApiResult<Json<DashboardAnalytics>> {
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let dashboard = state
        .db
        .analytics()
        .dashboard(days, Utc::now(), state.report_offset())
        .await?;
    Ok(Json(dashboard))
}
