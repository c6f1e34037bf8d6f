//! DTOs for the time-bucketed click report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::analytics::Series;

/// Query parameters for `GET /api/bitlinks/{id}/clicks`.
///
/// `units` is accepted for client compatibility; the series length is fixed
/// per unit.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct ClicksQuery {
    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub units: Option<i64>,
}

fn default_unit() -> String {
    "day".to_string()
}

/// Clicks in a single bucket.
#[derive(Debug, Serialize)]
pub struct LinkClicks {
    pub date: String,
    pub clicks: i64,
}

/// Zero-filled click series, newest bucket first.
#[derive(Debug, Serialize)]
pub struct ClicksResponse {
    pub unit_reference: DateTime<Utc>,
    pub link_clicks: Vec<LinkClicks>,
    pub units: usize,
    pub unit: String,
}

impl From<Series> for ClicksResponse {
    fn from(series: Series) -> Self {
        let unit = series.unit;
        Self {
            unit_reference: series.unit_reference,
            units: series.units(),
            unit: unit.to_string(),
            link_clicks: series
                .points
                .into_iter()
                .map(|p| LinkClicks {
                    date: unit.format_label(p.bucket_start),
                    clicks: p.clicks,
                })
                .collect(),
        }
    }
}
