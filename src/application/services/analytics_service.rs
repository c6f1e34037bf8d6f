//! Click reports for a link.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::analytics::{
    CountrySummary, Granularity, Series, build_series, summarize_countries, unique_visits,
};
use crate::domain::entities::ClickWithGeo;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Aggregates raw clicks into time series, country totals and unique visits.
///
/// Callers pass `now` explicitly so a report is computed against one fixed
/// reference instant.
pub struct AnalyticsService {
    repository: Arc<dyn ClickRepository>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn ClickRepository>) -> Self {
        Self { repository }
    }

    /// Zero-filled click series for `link_id`, newest bucket first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn clicks_series(
        &self,
        link_id: i64,
        granularity: Granularity,
        now: DateTime<Utc>,
    ) -> Result<Series, AppError> {
        let (start, end) = granularity.window(now);

        let rows = self
            .repository
            .query_range(link_id, start, end, granularity)
            .await?;

        Ok(build_series(granularity, now, &rows))
    }

    /// Per-country click totals over the whole lifetime of `link_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn clicks_by_country(
        &self,
        link_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CountrySummary, AppError> {
        let clicks = self.repository.all_with_geo(link_id).await?;
        Ok(summarize_countries(&clicks, now))
    }

    /// Visits of `link_id` with repeats of the same visitor collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn unique_clicks(&self, link_id: i64) -> Result<Vec<ClickWithGeo>, AppError> {
        let clicks = self.repository.all_with_geo(link_id).await?;
        Ok(unique_visits(clicks))
    }
}
