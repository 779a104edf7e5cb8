//! Liveness check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct MigrationHealth {
    pub applied: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    /// Absent when the database does not answer.
    pub migrations: Option<MigrationHealth>,
    pub version: &'static str,
}

/// `GET /health`
///
/// 200 when the database answers and every embedded migration is applied,
/// 503 otherwise.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let migrations = if database {
        match state.db.migration_status().await {
            Ok((total, applied)) => Some(MigrationHealth { applied, total }),
            Err(e) => {
                warn!(error = %e, "Could not read migration status");
                None
            }
        }
    } else {
        None
    };

    let healthy = matches!(&migrations, Some(m) if m.applied >= m.total);
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database,
            migrations,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
