//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, resolution and expiry
//! - [`services::click_service::ClickService`] - Click recording on the redirect path
//! - [`services::analytics_service::AnalyticsService`] - Click series, country and unique reports
//! - [`services::geo_enricher::GeoEnricher`] - Background IP geolocation
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
