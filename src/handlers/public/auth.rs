// Public auth endpoints: POST /auth/login, POST /auth/refresh, GET /auth/session

use axum::extract::{rejection::JsonRejection, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{GateState, Role, Session};
use crate::error::ApiError;
use crate::middleware::{bearer_token, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub session: Session,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    #[serde(flatten)]
    pub gate: GateState,
    pub redirect: Option<String>,
    pub email: Option<String>,
}

/// POST /auth/login - password sign-in against the identity service
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let session = state
        .identity
        .sign_in_with_password(request.email.trim(), &request.password)
        .await?;
    let role = Role::from_user(&session.user);
    tracing::info!("sign-in for {} (role {})", request.email.trim(), role);

    Ok(ApiResponse::success(LoginResponse { session, role }))
}

/// POST /auth/refresh - new session from a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let session = state.identity.refresh_session(request.refresh_token.trim()).await?;
    let role = Role::from_user(&session.user);
    Ok(ApiResponse::success(LoginResponse { session, role }))
}

/// GET /auth/session - gate state for the bearer token, always 200
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionStatus> {
    let (gate, email) = match bearer_token(&headers) {
        None => (GateState::resolve(Ok(None)), None),
        Some(token) => {
            let lookup = state.identity.get_session(token).await;
            let gate = GateState::resolve(lookup.as_ref().map(Option::as_ref));
            let email = lookup.ok().flatten().and_then(|s| s.user.email);
            (gate, email)
        }
    };

    Ok(ApiResponse::success(SessionStatus { redirect: gate.redirect(), gate, email }))
}
