//! IP geolocation provider clients.

mod ip_info;

pub use ip_info::IpInfoClient;
