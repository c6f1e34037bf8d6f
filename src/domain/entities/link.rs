//! Link entity representing a shortened URL owned by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL.
///
/// `expired` only ever flips from `false` to `true`; expired links stay in the
/// table so their clicks remain reportable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
    pub long_url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub expired: bool,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        user_id: i64,
        code: String,
        long_url: String,
        title: String,
        created_at: DateTime<Utc>,
        expired: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            code,
            long_url,
            title,
            created_at,
            expired,
        }
    }

    /// Returns true if the link can still be used for redirects.
    pub fn is_active(&self) -> bool {
        !self.expired
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub code: String,
    pub long_url: String,
    pub title: String,
}
