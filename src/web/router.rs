//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::dto::{ApiResponse, HealthResponse};
use super::handlers::{
    get_account, get_mailbox, get_message, get_unread_count, login, purge_message, register,
    restore_message, save_draft, send_message, toggle_flag, trash_message, update_draft,
    update_picture, AppState,
};
use super::middleware::{
    create_cors_layer, jwt_auth, login_rate_limit, security_headers, JwtState, RateLimitState,
};
use crate::config::ServerConfig;

/// Create the main API router, including `/health`.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    config: &ServerConfig,
) -> Router {
    let login_routes = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            login_rate_limit(state, req, next)
        }));

    let account_routes = Router::new()
        .route("/", get(get_account))
        .route("/register", post(register))
        .route("/picture", put(update_picture))
        .merge(login_routes);

    let mailbox_routes = Router::new()
        .route("/", get(get_mailbox))
        .route("/unread-count", get(get_unread_count));

    let message_routes = Router::new()
        .route("/", post(send_message))
        .route("/:id", get(get_message).delete(purge_message))
        .route("/:id/trash", put(trash_message))
        .route("/:id/restore", put(restore_message))
        .route("/:id/flags/:command", put(toggle_flag));

    let draft_routes = Router::new()
        .route("/", post(save_draft))
        .route("/:id", put(update_draft));

    let api_routes = Router::new()
        .nest("/account", account_routes)
        .nest("/mailbox", mailbox_routes)
        .nest("/messages", message_routes)
        .nest("/drafts", draft_routes);

    let body_limit = config.max_body_size_mb.saturating_mul(1024 * 1024);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
        .merge(create_health_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::new(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
