//! Route registration
//! Builds the API router and applies middleware

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{handlers, middleware::AppState};

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public endpoints (health check)
    let public_routes = Router::new().route("/health", get(handlers::health::health_check));

    // Account endpoints (unauthenticated by definition)
    let account_routes = Router::new()
        .route("/api/v1/account/register", post(handlers::account::register))
        .route("/api/v1/account/login", post(handlers::account::login));

    // The browser client is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .layer(cors)
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
