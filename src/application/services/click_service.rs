//! Click recording on the redirect path.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::entities::{Click, Link, NewClick};
use crate::domain::geo_job::GeoJob;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Records visits and hands them to the geolocation worker.
pub struct ClickService {
    repository: Arc<dyn ClickRepository>,
    geo_sender: mpsc::Sender<GeoJob>,
}

impl ClickService {
    /// Creates a new click service feeding `geo_sender`.
    pub fn new(repository: Arc<dyn ClickRepository>, geo_sender: mpsc::Sender<GeoJob>) -> Self {
        Self {
            repository,
            geo_sender,
        }
    }

    /// Stores one click for `link` and schedules its geolocation.
    ///
    /// Every call inserts a row; repeated visits are collapsed only by the
    /// unique-clicks report. Scheduling never blocks: when the queue is full
    /// or the worker is gone, the job is dropped with a warning and the click
    /// stays without geolocation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the click cannot be stored.
    pub async fn record(
        &self,
        link: &Link,
        ip: String,
        user_agent: String,
    ) -> Result<Click, AppError> {
        let click = self
            .repository
            .insert(NewClick {
                link_id: link.id,
                ip,
                user_agent,
            })
            .await?;

        metrics::counter!("clicks_recorded_total").increment(1);
        debug!(click_id = click.id, link_id = link.id, "Click recorded");

        match self.geo_sender.try_send(GeoJob::new(click.id, click.ip.clone())) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                metrics::counter!("geo_jobs_dropped_total").increment(1);
                warn!(click_id = job.click_id, "Geo queue full, dropping lookup");
            }
            Err(TrySendError::Closed(job)) => {
                metrics::counter!("geo_jobs_dropped_total").increment(1);
                warn!(click_id = job.click_id, "Geo worker is not running, dropping lookup");
            }
        }

        Ok(click)
    }

    /// Returns true while the geolocation worker is still receiving jobs.
    pub fn geo_queue_open(&self) -> bool {
        !self.geo_sender.is_closed()
    }

    /// Free slots in the geolocation queue.
    pub fn geo_queue_capacity(&self) -> usize {
        self.geo_sender.capacity()
    }
}
