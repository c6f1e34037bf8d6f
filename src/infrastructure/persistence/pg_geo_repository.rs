//! PostgreSQL implementation of geolocation repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{GeoInfo, NewGeoInfo};
use crate::domain::repositories::GeoRepository;
use crate::error::AppError;

const GEO_COLUMNS: &str =
    "click_id, ip, city, region, country, loc, org, postal, timezone, created_at";

/// PostgreSQL repository for click geolocation rows.
pub struct PgGeoRepository {
    pool: Arc<PgPool>,
}

impl PgGeoRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeoRepository for PgGeoRepository {
    async fn save(&self, geo: NewGeoInfo) -> Result<GeoInfo, AppError> {
        let location = geo.location;

        let saved = sqlx::query_as::<_, GeoInfo>(&format!(
            r#"
            INSERT INTO geo_info (click_id, ip, city, region, country, loc, org, postal, timezone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {GEO_COLUMNS}
            "#
        ))
        .bind(geo.click_id)
        .bind(&geo.ip)
        .bind(location.city)
        .bind(location.region)
        .bind(location.country)
        .bind(location.loc)
        .bind(location.org)
        .bind(location.postal)
        .bind(location.timezone)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(saved)
    }

    async fn find_by_click(&self, click_id: i64) -> Result<Option<GeoInfo>, AppError> {
        let geo = sqlx::query_as::<_, GeoInfo>(&format!(
            "SELECT {GEO_COLUMNS} FROM geo_info WHERE click_id = $1"
        ))
        .bind(click_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(geo)
    }
}
