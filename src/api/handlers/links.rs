//! Handlers for link management endpoints (list, get, expire).

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::link::{LinkListResponse, LinkResponse, PaginationMeta};
use crate::api::dto::pagination::LinkListParams;
use crate::api::middleware::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/bitlinks?page=1&page_size=25&active=true`
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are out of range.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<LinkListParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (offset, limit) = params
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let page = state
        .link_service
        .list_links(user.id, params.active_only(), offset, limit)
        .await?;

    let items = page
        .items
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(LinkListResponse {
        items,
        pagination: PaginationMeta::new(
            params.page.unwrap_or(1),
            limit as u32,
            page.total,
        ),
    }))
}

/// Returns one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/bitlinks/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another user.
pub async fn get_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_owned_link(id, user.id).await?;
    let short_url = state.link_service.short_url(&link.code);

    Ok(Json(LinkResponse::from_link(link, short_url)))
}

/// Expires one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/bitlinks/{id}`
///
/// The row is kept; redirects for the code answer 410 Gone from now on and
/// its click history stays queryable.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to another user.
pub async fn expire_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.expire_link(id, user.id).await?;
    let short_url = state.link_service.short_url(&link.code);

    Ok(Json(LinkResponse::from_link(link, short_url)))
}
