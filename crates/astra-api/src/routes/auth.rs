use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    middleware::auth::{cleared_cookie, session_cookie},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
}

/// Sign in as the site admin
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionResponse),
        (status = 401, description = "Wrong credentials", body = SessionResponse)
    ),
    tag = "admin"
)]
pub async fn login(State(state): State<Arc<AppState>>, Json(req): Json<LoginRequest>) -> Response {
    let config = &state.config;

    if req.email == config.admin_email && req.password == config.admin_password {
        tracing::info!("Admin signed in");
        (
            [(SET_COOKIE, session_cookie(config.site.secure_cookies))],
            Json(SessionResponse { success: true }),
        )
            .into_response()
    } else {
        tracing::warn!("Rejected admin sign-in");
        (StatusCode::UNAUTHORIZED, Json(SessionResponse { success: false })).into_response()
    }
}

/// End the admin session
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = SessionResponse)
    ),
    tag = "admin"
)]
pub async fn logout() -> Response {
    (
        [(SET_COOKIE, cleared_cookie())],
        Json(SessionResponse { success: true }),
    )
        .into_response()
}
