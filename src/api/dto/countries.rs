//! DTOs for the per-country click report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::analytics::CountrySummary;

/// Clicks for one country code.
#[derive(Debug, Serialize)]
pub struct CountryMetric {
    pub value: String,
    pub clicks: i64,
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub unit_reference: DateTime<Utc>,
    pub metrics: Vec<CountryMetric>,
    pub units: usize,
    pub unit: String,
    pub facet: String,
}

impl From<CountrySummary> for CountriesResponse {
    fn from(summary: CountrySummary) -> Self {
        Self {
            unit_reference: summary.unit_reference,
            metrics: summary
                .metrics
                .into_iter()
                .map(|m| CountryMetric {
                    value: m.country,
                    clicks: m.clicks,
                })
                .collect(),
            units: summary.units,
            unit: "day".to_string(),
            facet: "countries".to_string(),
        }
    }
}
