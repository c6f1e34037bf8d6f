//! User entity owning links and API tokens.

use chrono::{DateTime, Utc};

/// An account that owns short links.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub external_api_token: Option<String>,
    pub created_at: DateTime<Utc>,
}
