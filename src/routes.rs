//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: DB, cache, geo queue (public)
//! - `/api/*`            - REST API (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token resolving the calling user
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and auth without rate limiting.
///
/// Handlers that need the visitor address extract
/// `ConnectInfo<SocketAddr>`, so the router must be served with
/// `into_make_service_with_connect_info` (or given `ConnectInfo` by a test
/// layer).
pub fn router(state: AppState) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
}

/// Constructs the production application router with all middleware.
///
/// The API gets the stricter [`rate_limit::secure_layer`], public routes the
/// lenient [`rate_limit::layer`]. When `state.behind_proxy` is set, rate
/// limits key on proxy headers instead of the peer socket address.
///
/// # Errors
///
/// Returns an error if a rate limiter configuration is rejected.
pub fn app_router(state: AppState) -> anyhow::Result<NormalizePath<Router>> {
    let behind_proxy = state.behind_proxy;

    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::secure_layer(behind_proxy)?);

    let public_router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .layer(rate_limit::layer(behind_proxy)?);

    let router = Router::new()
        .merge(public_router)
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
