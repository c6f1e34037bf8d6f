//! Geolocation job handed from the redirect path to the background worker.

/// Request to geolocate the IP of a freshly stored click.
///
/// Created by [`crate::application::services::ClickService::record`] right
/// after the click row is inserted, so every click id is enqueued exactly
/// once. Processed by [`crate::domain::geo_worker::run_geo_worker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoJob {
    pub click_id: i64,
    pub ip: String,
}

impl GeoJob {
    pub fn new(click_id: i64, ip: impl Into<String>) -> Self {
        Self {
            click_id,
            ip: ip.into(),
        }
    }
}
