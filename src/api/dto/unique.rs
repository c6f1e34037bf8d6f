//! DTOs for the unique-visits report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{ClickWithGeo, GeoInfo};

/// Marker returned in place of geolocation when none was stored.
pub const NO_GEO_INFO: &str = "No IP info found";

/// One unique visit.
///
/// Geolocation fields are flattened into the entry; when the click has no
/// stored geolocation an `error` field is emitted instead.
#[derive(Debug, Serialize)]
pub struct UniqueClick {
    pub id: i64,
    pub ip: String,
    pub user_agent: String,
    pub clicked_at: DateTime<Utc>,

    #[serde(flatten)]
    pub location: UniqueClickLocation,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UniqueClickLocation {
    Found {
        city: Option<String>,
        region: Option<String>,
        country: Option<String>,
        loc: Option<String>,
        org: Option<String>,
        postal: Option<String>,
        timezone: Option<String>,
    },
    Missing {
        error: String,
    },
}

impl From<Option<GeoInfo>> for UniqueClickLocation {
    fn from(geo: Option<GeoInfo>) -> Self {
        match geo {
            Some(g) => UniqueClickLocation::Found {
                city: g.city,
                region: g.region,
                country: g.country,
                loc: g.loc,
                org: g.org,
                postal: g.postal,
                timezone: g.timezone,
            },
            None => UniqueClickLocation::Missing {
                error: NO_GEO_INFO.to_string(),
            },
        }
    }
}

impl From<ClickWithGeo> for UniqueClick {
    fn from(entry: ClickWithGeo) -> Self {
        Self {
            id: entry.click.id,
            ip: entry.click.ip,
            user_agent: entry.click.user_agent,
            clicked_at: entry.click.clicked_at,
            location: entry.geo.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UniqueClicksResponse {
    pub unique_clicks: Vec<UniqueClick>,
    pub total_unique_clicks: usize,
}

impl From<Vec<ClickWithGeo>> for UniqueClicksResponse {
    fn from(entries: Vec<ClickWithGeo>) -> Self {
        let unique_clicks: Vec<UniqueClick> = entries.into_iter().map(Into::into).collect();
        Self {
            total_unique_clicks: unique_clicks.len(),
            unique_clicks,
        }
    }
}
