//! Business logic services for the application layer.

pub mod analytics_service;
pub mod auth_service;
pub mod click_service;
pub mod geo_enricher;
pub mod link_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use click_service::ClickService;
pub use geo_enricher::GeoEnricher;
pub use link_service::{LinkPage, LinkService};
