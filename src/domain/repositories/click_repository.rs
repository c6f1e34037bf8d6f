//! Repository trait for raw click rows.

use crate::domain::analytics::{BucketCount, Granularity};
use crate::domain::entities::{Click, ClickWithGeo, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for click recording and the queries behind reports.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click. The timestamp comes from the database clock.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the referenced link does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts clicks in `[start, end]`, grouped by the UTC bucket start of
    /// `granularity`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn query_range(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<Vec<BucketCount>, AppError>;

    /// All clicks of a link in timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn all_for_link(&self, link_id: i64) -> Result<Vec<Click>, AppError>;

    /// All clicks of a link joined with their geolocation, in timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn all_with_geo(&self, link_id: i64) -> Result<Vec<ClickWithGeo>, AppError>;

    /// Total clicks of a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError>;
}
