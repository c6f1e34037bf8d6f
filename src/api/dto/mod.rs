//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod clicks;
pub mod countries;
pub mod health;
pub mod link;
pub mod pagination;
pub mod shorten;
pub mod unique;
pub mod user;
