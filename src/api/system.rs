use axum::{Json, extract::State};
use std::sync::Arc;

use super::{
    ApiError, AppState, BannerEndpoints, BannerResponse, DefaultAdminNotice, HealthResponse,
};
use crate::services::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};

/// GET /
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Gym Management API is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: BannerEndpoints {
            login: "POST /api/auth/login",
            register: "POST /api/auth/register",
            change_password: "POST /api/auth/change-password",
            health: "GET /api/health",
        },
        default_admin: DefaultAdminNotice {
            username: DEFAULT_ADMIN_USERNAME,
            password: DEFAULT_ADMIN_PASSWORD,
            note: "Please change this password immediately using /api/auth/change-password",
        },
    })
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .store()
        .ping()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(format!("Database ping failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}
