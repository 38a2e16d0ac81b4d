//! Authentication middleware for JWT token validation

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, jwt::TokenType, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Extract and validate the bearer access token from a request
fn authenticate(state: &AppState, req: &Request<axum::body::Body>) -> Result<AuthUser, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|e| {
            debug!("Failed to validate token: {}", e);
            ApiError::Unauthorized
        })?;

    if claims.token_type != TokenType::Access {
        return Err(ApiError::Unauthorized);
    }

    Ok(AuthUser { id: claims.sub })
}

/// Authentication middleware; rejects requests without a valid access token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &req)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Viewer middleware for publicly readable routes
///
/// Populates the viewer identity when a valid access token is present so
/// that responses can carry viewer-scoped flags (is_subscribed,
/// is_favorited, is_in_shopping_cart); anonymous requests pass through.
pub async fn viewer_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Ok(user) = authenticate(&state, &req) {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
