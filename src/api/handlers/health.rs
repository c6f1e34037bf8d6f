//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1` through the link store
/// 2. **Geo Queue**: Checks the geolocation worker still receives jobs
/// 3. **Cache**: Redis PING (always healthy when caching is disabled)
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let geo_queue = check_geo_queue(&state);
    let cache = check_cache(&state).await;

    let all_healthy = database.is_healthy() && geo_queue.is_healthy() && cache.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            geo_queue,
            cache,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.link_service.ping().await {
        Ok(()) => CheckStatus::healthy(Some("Connected".to_string())),
        Err(e) => CheckStatus::unhealthy(format!("Database error: {e}")),
    }
}

fn check_geo_queue(state: &AppState) -> CheckStatus {
    if state.click_service.geo_queue_open() {
        CheckStatus::healthy(Some(format!(
            "Free slots: {}",
            state.click_service.geo_queue_capacity()
        )))
    } else {
        CheckStatus::unhealthy("Geo worker is not running")
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus::healthy(None)
    } else {
        CheckStatus::unhealthy("Redis connection failed")
    }
}
