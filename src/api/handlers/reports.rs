//! Handlers for click report endpoints.
//!
//! Every report first checks that the link belongs to the caller; a link of
//! another user answers 404 like a missing one.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;

use crate::api::dto::clicks::{ClicksQuery, ClicksResponse};
use crate::api::dto::countries::CountriesResponse;
use crate::api::dto::unique::UniqueClicksResponse;
use crate::api::middleware::auth::CurrentUser;
use crate::domain::analytics::Granularity;
use crate::error::AppError;
use crate::state::AppState;

/// Zero-filled click series.
///
/// # Endpoint
///
/// `GET /api/bitlinks/{id}/clicks?unit=day`
///
/// `unit` is one of `minute`, `hour`, `day` (default), `week` or `month`.
///
/// # Errors
///
/// Returns 400 Bad Request for an unknown unit.
/// Returns 404 Not Found if the link is not the caller's.
pub async fn clicks_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ClicksQuery>,
) -> Result<Json<ClicksResponse>, AppError> {
    let granularity: Granularity = query.unit.parse()?;
    let link = state.link_service.get_owned_link(id, user.id).await?;

    let series = state
        .analytics_service
        .clicks_series(link.id, granularity, Utc::now())
        .await?;

    Ok(Json(series.into()))
}

/// Clicks per country over the lifetime of the link.
///
/// # Endpoint
///
/// `GET /api/bitlinks/{id}/countries`
pub async fn countries_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<CountriesResponse>, AppError> {
    let link = state.link_service.get_owned_link(id, user.id).await?;

    let summary = state
        .analytics_service
        .clicks_by_country(link.id, Utc::now())
        .await?;

    Ok(Json(summary.into()))
}

/// Visits with repeats of the same visitor inside 12 hours collapsed.
///
/// # Endpoint
///
/// `GET /api/bitlinks/{id}/clicks/unique`
pub async fn unique_clicks_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<UniqueClicksResponse>, AppError> {
    let link = state.link_service.get_owned_link(id, user.id).await?;

    let unique = state.analytics_service.unique_clicks(link.id).await?;

    Ok(Json(unique.into()))
}
