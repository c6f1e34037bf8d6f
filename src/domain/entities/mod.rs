//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL owned by a user
//! - [`Click`] - A recorded visit of a link
//! - [`GeoInfo`] - Geolocation attached to a click
//! - [`User`] - Owner of links and API tokens
//!
//! Entities come with separate `New*` structs used for creation.

pub mod click;
pub mod geo_info;
pub mod link;
pub mod user;

pub use click::{Click, ClickWithGeo, NewClick};
pub use geo_info::{GeoInfo, GeoLookupResult, NewGeoInfo};
pub use link::{Link, NewLink};
pub use user::User;
