//! Shared application state.

use std::sync::Arc;

use chrono::FixedOffset;
use maguva_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Immutable state handed to every handler.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> SharedState {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
        Arc::new(AppState { db, jwt, config })
    }

    /// Regional offset for report days.
    pub fn report_offset(&self) -> FixedOffset {
        self.config.report_offset()
    }
}
