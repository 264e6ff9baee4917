//! Vault service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{LoginRequest, NewPasswordRecord, RegisterRequest},
    settings::ServerConfig,
    state::AppState,
};

/// Maximum accepted request body size (64KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Create the router for the vault service
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/auth/user",
            get(current_user).fallback(method_not_allowed),
        )
        .route(
            "/api/passwords",
            get(list_passwords)
                .post(create_password)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/passwords/:id",
            delete(delete_password).fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/auth/register",
            post(register).fallback(method_not_allowed),
        )
        .route("/api/auth/login", post(login).fallback(method_not_allowed))
        .merge(protected_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer(&server.cors_allowed_origins))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
}

/// Build the single CORS policy for every route
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "vault"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth_service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "userId": user.id
        })),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}

/// Profile of the authenticated user
pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.auth_service.profile(user.id).await?;
    Ok(Json(profile))
}

/// List the caller's password records
pub async fn list_passwords(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let records = state.password_repository.list_for_user(user.id).await?;
    Ok(Json(records))
}

/// Store a password record owned by the caller
pub async fn create_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<NewPasswordRecord>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .password_repository
        .create(user.id, &payload.sanitized())
        .await?;

    info!("User {} stored password record {}", user.username, record.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "result": {
                "acknowledged": true,
                "insertedId": record.id
            }
        })),
    ))
}

/// Delete one of the caller's password records
pub async fn delete_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let missing = || ApiError::NotFound("Password not found or unauthorized".to_string());

    // An id that cannot exist matches nothing
    let id = Uuid::parse_str(&id).map_err(|_| missing())?;

    let deleted = state
        .password_repository
        .delete_for_user(user.id, id)
        .await?;

    if !deleted {
        return Err(missing());
    }

    info!("User {} deleted password record {}", user.username, id);

    Ok(Json(json!({
        "success": true,
        "result": {
            "acknowledged": true,
            "deletedCount": 1
        }
    })))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
