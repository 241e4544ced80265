use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

pub const ADMIN_COOKIE: &str = "admin_token";
pub const ADMIN_COOKIE_VALUE: &str = "authenticated";
pub const ADMIN_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// True when the request carries `admin_token=authenticated`
pub fn has_admin_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == ADMIN_COOKIE && value == ADMIN_COOKIE_VALUE)
}

/// Reject admin routes without the admin cookie
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    if !has_admin_cookie(req.headers()) {
        tracing::warn!(uri = %req.uri(), "Rejected admin request without session cookie");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}

/// `Set-Cookie` value that opens an admin session
pub fn session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        ADMIN_COOKIE, ADMIN_COOKIE_VALUE, ADMIN_COOKIE_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that ends an admin session
pub fn cleared_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0", ADMIN_COOKIE)
}
