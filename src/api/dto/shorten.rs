//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::Link;

/// Compiled regex for custom back-half validation.
static CUSTOM_BACK_HALF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap());

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Human readable label shown in link listings.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Destination URL. A missing scheme defaults to `http://`.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub long_url: String,

    /// Optional custom short code.
    #[validate(length(min = 4, max = 32))]
    #[validate(regex(path = "*CUSTOM_BACK_HALF_REGEX"))]
    pub custom_back_half: Option<String>,
}

/// Created (or reused) short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    /// Full short URL, e.g. `https://s.example.com/abc1234`.
    pub link: String,
    pub title: String,
    pub long_url: String,
    pub id: i64,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl ShortenResponse {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            link: short_url,
            title: link.title,
            long_url: link.long_url,
            id: link.id,
            code: link.code,
            created_at: link.created_at,
        }
    }
}
