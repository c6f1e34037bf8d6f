//! Contract of the external IP geolocation provider.

use std::net::IpAddr;

use crate::domain::entities::GeoLookupResult;
use crate::error::AppError;
use async_trait::async_trait;

/// Resolves an IP address to a location.
///
/// # Implementations
///
/// - [`crate::infrastructure::geo::IpInfoClient`] - ipinfo.io compatible HTTP API
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Looks up `ip`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamFailure`] on network errors, non-success
    /// statuses or malformed payloads.
    async fn lookup(&self, ip: IpAddr) -> Result<GeoLookupResult, AppError>;
}
