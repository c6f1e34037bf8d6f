//! Background worker draining the geolocation queue.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

use crate::application::services::GeoEnricher;
use crate::domain::geo_job::GeoJob;

/// Consumes [`GeoJob`]s until every sender is dropped.
///
/// At most `concurrency` lookups run at once. Each job is attempted exactly
/// once; failures are logged inside [`GeoEnricher::enrich`]. Jobs still
/// queued when the process stops are lost.
pub async fn run_geo_worker(
    mut rx: mpsc::Receiver<GeoJob>,
    enricher: Arc<GeoEnricher>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(job) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let enricher = enricher.clone();
        tokio::spawn(async move {
            debug!(click_id = job.click_id, "Geolocating click");
            enricher.enrich(job).await;
            drop(permit);
        });
    }

    info!("Geo worker stopped: queue closed");
}
