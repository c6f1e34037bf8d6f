//! Handler for the current user endpoint.

use axum::{Extension, Json};

use crate::api::dto::user::UserResponse;
use crate::api::middleware::auth::CurrentUser;

/// Returns the user owning the presented API token.
///
/// # Endpoint
///
/// `GET /api/users/me`
pub async fn me_handler(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(user.into())
}
