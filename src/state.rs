//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AnalyticsService, AuthService, ClickService, LinkService};
use crate::infrastructure::cache::CacheService;

/// Services and handles shared by every request.
///
/// Cloning is cheap: every field is reference-counted or `Copy`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub click_service: Arc<ClickService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
    /// Trust proxy headers when determining the visitor IP of a click.
    pub behind_proxy: bool,
}
