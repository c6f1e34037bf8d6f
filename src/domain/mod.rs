//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`analytics`] - Bucketing, country and unique-visit aggregation
//! - [`geo_lookup`] - External geolocation provider contract
//! - [`geo_job`] - Geolocation job model
//! - [`geo_worker`] - Asynchronous geolocation worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves the short code
//! 2. The click row is inserted via [`repositories::ClickRepository`]
//! 3. A [`geo_job::GeoJob`] is pushed to a bounded channel (never awaited)
//! 4. The client is redirected
//! 5. [`geo_worker::run_geo_worker`] geolocates the IP and stores the result

pub mod analytics;
pub mod entities;
pub mod geo_job;
pub mod geo_lookup;
pub mod geo_worker;
pub mod repositories;
