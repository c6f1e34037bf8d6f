//! Off-request geolocation of recorded clicks.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::NewGeoInfo;
use crate::domain::geo_job::GeoJob;
use crate::domain::geo_lookup::GeoLookup;
use crate::domain::repositories::GeoRepository;

/// Looks up the location of a click IP and stores it.
///
/// Enrichment is best effort: one lookup per job, no retries. Any failure
/// leaves the click without geolocation, which every report tolerates.
pub struct GeoEnricher {
    lookup: Arc<dyn GeoLookup>,
    repository: Arc<dyn GeoRepository>,
}

impl GeoEnricher {
    pub fn new(lookup: Arc<dyn GeoLookup>, repository: Arc<dyn GeoRepository>) -> Self {
        Self { lookup, repository }
    }

    /// Processes one job. Never fails; errors are logged and counted.
    ///
    /// Jobs whose IP does not parse as an address are dropped without a
    /// provider request.
    pub async fn enrich(&self, job: GeoJob) {
        let ip = match job.ip.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => {
                metrics::counter!("geo_lookups_failed_total").increment(1);
                warn!(click_id = job.click_id, ip = %job.ip, "Skipping geo lookup for invalid IP");
                return;
            }
        };

        let location = match self.lookup.lookup(ip).await {
            Ok(location) => location,
            Err(e) => {
                metrics::counter!("geo_lookups_failed_total").increment(1);
                warn!(click_id = job.click_id, ip = %job.ip, error = %e, "Geo lookup failed");
                return;
            }
        };

        let new_geo = NewGeoInfo {
            click_id: job.click_id,
            ip: job.ip,
            location,
        };

        match self.repository.save(new_geo).await {
            Ok(geo) => {
                metrics::counter!("geo_lookups_succeeded_total").increment(1);
                debug!(
                    click_id = geo.click_id,
                    country = geo.country.as_deref().unwrap_or("-"),
                    "Click geolocated"
                );
            }
            Err(e) => {
                metrics::counter!("geo_lookups_failed_total").increment(1);
                warn!(click_id = job.click_id, error = %e, "Failed to store geolocation");
            }
        }
    }
}
