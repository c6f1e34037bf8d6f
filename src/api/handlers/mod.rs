//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;
pub mod reports;
pub mod shorten;
pub mod users;

pub use health::health_handler;
pub use links::{expire_link_handler, get_link_handler, list_links_handler};
pub use redirect::redirect_handler;
pub use reports::{clicks_handler, countries_handler, unique_clicks_handler};
pub use shorten::shorten_handler;
pub use users::me_handler;
