//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

use super::geo_info::GeoInfo;

/// A recorded visit of a short link.
///
/// Clicks are immutable once stored. Every redirect produces one row;
/// repeated visits are only collapsed at read time.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub ip: String,
    pub user_agent: String,
    pub clicked_at: DateTime<Utc>,
}

impl Click {
    /// Creates a new Click instance.
    pub fn new(
        id: i64,
        link_id: i64,
        ip: String,
        user_agent: String,
        clicked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            link_id,
            ip,
            user_agent,
            clicked_at,
        }
    }
}

/// Input data for recording a new click.
///
/// The timestamp is assigned by the database clock.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub ip: String,
    pub user_agent: String,
}

/// A click joined with its (optional) geolocation.
#[derive(Debug, Clone)]
pub struct ClickWithGeo {
    pub click: Click,
    pub geo: Option<GeoInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_creation() {
        let now = Utc::now();
        let click = Click::new(
            1,
            42,
            "192.168.1.1".to_string(),
            "Mozilla/5.0".to_string(),
            now,
        );

        assert_eq!(click.id, 1);
        assert_eq!(click.link_id, 42);
        assert_eq!(click.ip, "192.168.1.1");
        assert_eq!(click.user_agent, "Mozilla/5.0");
        assert_eq!(click.clicked_at, now);
    }

    #[test]
    fn test_click_accepts_ipv6() {
        let click = Click::new(2, 1, "2001:db8::1".to_string(), "curl/8".to_string(), Utc::now());
        assert_eq!(click.ip, "2001:db8::1");
    }
}
