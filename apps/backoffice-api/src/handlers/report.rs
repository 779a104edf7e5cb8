//! End-of-day report.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use maguva_core::analytics::local_date;
use maguva_core::reports::DailyReport;
use maguva_core::validation::parse_date;
use serde::Deserialize;

use crate::auth::StaffUser;
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub date: Option<String>,
}

/// `GET /manguva/report/?date=YYYY-MM-DD`
///
/// Without a date, reports today in the shop's regional offset.
pub async fn daily(
    _staff: StaffUser,
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<ReportParams>,
) -> ApiResult<Json<DailyReport>> {
    let offset = state.report_offset();
    let date = match params.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date("date", raw)?,
        None => local_date(Utc::now(), offset),
    };

    Ok(Json(state.db.reports().daily_report(date, offset).await?))
}
