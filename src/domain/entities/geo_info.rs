//! Geolocation data attached to a click.

use chrono::{DateTime, Utc};

/// Geolocation of the IP behind a click.
///
/// At most one row exists per click. Every field is optional because the
/// lookup provider omits what it does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct GeoInfo {
    pub click_id: i64,
    pub ip: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub loc: Option<String>,
    pub org: Option<String>,
    pub postal: Option<String>,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of an IP geolocation lookup, before it is bound to a click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLookupResult {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub loc: Option<String>,
    pub org: Option<String>,
    pub postal: Option<String>,
    pub timezone: Option<String>,
}

/// Input data for persisting a lookup result.
#[derive(Debug, Clone)]
pub struct NewGeoInfo {
    pub click_id: i64,
    pub ip: String,
    pub location: GeoLookupResult,
}
