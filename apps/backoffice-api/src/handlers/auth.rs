//! Login and token verification.

use axum::extract::State;
use axum::Json;
use maguva_core::requests::LoginRequest;
use maguva_core::UserProfile;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user: UserProfile,
}

/// `POST /login`
pub async fn login(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let Some(user) = state
        .db
        .users()
        .authenticate(&request.email, &request.password)
        .await?
    else {
        warn!("Login failed");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    let access = state.jwt.generate_access_token(&user)?;
    info!(user_id = %user.id, role = user.role().as_str(), "User logged in");

    Ok(Json(LoginResponse {
        access,
        user: user.profile(),
    }))
}

/// `GET /auth/verify`
pub async fn verify(auth: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        user: auth.user.profile(),
    })
}
