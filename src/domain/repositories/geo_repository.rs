//! Repository trait for click geolocation rows.

use crate::domain::entities::{GeoInfo, NewGeoInfo};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for geolocation attached to clicks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgGeoRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoRepository: Send + Sync {
    /// Stores the geolocation of a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the click already has geolocation.
    /// Returns [`AppError::Internal`] on database errors.
    async fn save(&self, geo: NewGeoInfo) -> Result<GeoInfo, AppError>;

    /// Finds the geolocation of a click, if the lookup has run and succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_click(&self, click_id: i64) -> Result<Option<GeoInfo>, AppError>;
}
