use crate::auth::jwt::validate_token;
use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clipdock_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
}

/// Bearer-token middleware for the upload routes.
///
/// Runs before the request body is touched: a request with a missing or
/// invalid token is rejected without reading a single payload byte. On
/// success the caller's identity is stored in request extensions for
/// handlers to extract as [`AuthContext`].
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match validate_token(token, &auth_state.jwt_secret) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthContext { user_id });
            next.run(request).await
        }
        Err(err) => HttpAppError(err).into_response(),
    }
}
