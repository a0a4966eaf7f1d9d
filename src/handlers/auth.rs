use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::info;

use super::common::{json_body, validate_input};
use crate::{
    auth::{expired_session_cookies, AuthError, AuthUser},
    dto::auth::{LoginRequest, LoginResponse},
    errors::{ApiError, ServiceError},
    AppState,
};

/// Routes that need an authenticated caller
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/me", get(current_user))
}

/// Routes reachable without a session
pub fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// The signed-in user's stored profile
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = crate::entities::app_user::Model),
        (status = 401, description = "No valid session", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let stored = state
        .auth
        .find_user(&user.email)
        .await?
        .ok_or(AuthError::MissingAuth)?;
    Ok(Json(stored))
}

/// Issues a session for an e-mail address. Only mounted when local login is enabled.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued; SESSION cookie set", body = LoginResponse),
        (status = 400, description = "Invalid e-mail or name", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account disabled", body = crate::errors::ErrorResponse),
        (status = 404, description = "Local login disabled", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.config.auth_local_login {
        return Err(ServiceError::NotFound("Local login is disabled".to_string()).into());
    }
    let request = json_body(body)?;
    validate_input(&request)?;

    let user = state.auth.provision_user(&request.email, &request.name).await?;
    let token = state.auth.issue_token(&user)?;
    let cookie = HeaderValue::from_str(&state.auth.session_cookie(&token))
        .map_err(|e| ServiceError::InternalError(e.to_string()))?;
    info!(email = %user.email, role = %user.role, "session issued");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { token, user }),
    ))
}

/// Expires the session cookies
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Session cookies cleared")),
    tag = "auth"
)]
pub async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    for cookie in expired_session_cookies() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }
    (StatusCode::NO_CONTENT, headers)
}
