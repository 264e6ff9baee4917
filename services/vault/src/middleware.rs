//! Authentication middleware for JWT token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Authentication middleware
///
/// A request without a bearer token is rejected with 401; a token that
/// fails signature or expiry checks is rejected with 403.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| {
            warn!("Rejected request to {} without bearer token", req.uri().path());
            ApiError::Unauthorized("Access denied. No token provided.".to_string())
        })?;

    let claims = state.jwt_service().verify(bearer.token()).map_err(|e| {
        warn!("Rejected invalid token: {}", e);
        ApiError::Forbidden("Invalid token".to_string())
    })?;

    // Insert the user into the request extensions
    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(req).await)
}
