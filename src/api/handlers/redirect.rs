//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::{client_ip, user_agent};

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code (cache first, then database)
/// 2. Store the click with visitor IP and user agent
/// 3. Queue the click for geolocation (never blocks)
/// 4. Return 307 Temporary Redirect
///
/// The click row is written before the redirect is sent; geolocation
/// happens later on the background worker.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 410 Gone if the link has been expired.
/// Returns 500 if the click cannot be stored.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve_for_redirect(&code).await?;

    let ip = client_ip(&headers, addr, state.behind_proxy).to_string();
    let click = state
        .click_service
        .record(&link, ip, user_agent(&headers))
        .await?;

    debug!(code = %link.code, click_id = click.id, "Redirecting");

    Ok(Redirect::temporary(&link.long_url))
}
