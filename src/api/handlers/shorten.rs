//! Handler for link shortening endpoint.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the authenticated user.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Docs",
///   "long_url": "https://example.com/docs",
///   "custom_back_half": "docs"
/// }
/// ```
///
/// `custom_back_half` is optional. If the caller already has an active link
/// for the same normalized URL, that link is returned instead.
///
/// # Response
///
/// ```json
/// {
///   "link": "https://s.example.com/docs",
///   "title": "Docs",
///   "long_url": "https://example.com/docs",
///   "id": 42,
///   "code": "docs",
///   "created_at": "2024-06-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
/// Returns 409 Conflict if the custom back-half is taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .shorten(
            user.id,
            payload.title,
            payload.long_url,
            payload.custom_back_half,
        )
        .await?;

    let short_url = state.link_service.short_url(&link.code);

    Ok(Json(ShortenResponse::from_link(link, short_url)))
}
