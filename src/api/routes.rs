//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    clicks_handler, countries_handler, expire_link_handler, get_link_handler,
    list_links_handler, me_handler, shorten_handler, unique_clicks_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /shorten`                     - Create a short link
/// - `GET    /bitlinks`                    - List the caller's links (paginated)
/// - `GET    /bitlinks/{id}`               - Link details
/// - `DELETE /bitlinks/{id}`               - Expire a link
/// - `GET    /bitlinks/{id}/clicks`        - Click series by unit
/// - `GET    /bitlinks/{id}/countries`     - Clicks per country
/// - `GET    /bitlinks/{id}/clicks/unique` - Unique visits
/// - `GET    /users/me`                    - The authenticated user
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/bitlinks", get(list_links_handler))
        .route(
            "/bitlinks/{id}",
            get(get_link_handler).delete(expire_link_handler),
        )
        .route("/bitlinks/{id}/clicks", get(clicks_handler))
        .route("/bitlinks/{id}/countries", get(countries_handler))
        .route("/bitlinks/{id}/clicks/unique", get(unique_clicks_handler))
        .route("/users/me", get(me_handler))
}
