use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState, ChangePasswordRequest, CredentialsRequest, MessageResponse};
use crate::services::{AuthenticatedAdmin, LoginResult};

// ============================================================================
// Middleware
// ============================================================================

/// Rejects the request with 401 unless it carries a valid `Authorization: Bearer` token.
///
/// On success the asserted identity is inserted as an [`AuthenticatedAdmin`]
/// request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let admin = {
        let token = bearer_token(request.headers()).ok_or_else(ApiError::unauthorized)?;
        state.auth().authenticate(token).map_err(|e| {
            tracing::debug!("Bearer token rejected: {e}");
            ApiError::unauthorized()
        })?
    };

    tracing::Span::current().record("user_id", admin.id);
    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();

    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(token)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| {
            tracing::debug!("Rejected request body: {}", e.body_text());
            ApiError::validation("Invalid request body")
        })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResult>, ApiError> {
    let payload = json_body(payload)?;

    let result = state
        .auth()
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(result))
}

/// POST /api/auth/register
///
/// Open to unauthenticated callers.
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload = json_body(payload)?;

    state
        .auth()
        .register(&payload.username, &payload.password)
        .await?;

    Ok(Json(MessageResponse::new("Admin user created successfully")))
}

/// POST /api/auth/change-password
///
/// Previously issued tokens stay valid until they expire.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload = json_body(payload)?;

    state
        .auth()
        .change_password(admin.id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}
