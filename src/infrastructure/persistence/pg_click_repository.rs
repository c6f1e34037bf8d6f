//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::analytics::{BucketCount, Granularity};
use crate::domain::entities::{Click, ClickWithGeo, GeoInfo, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Flat row of `clicks LEFT JOIN geo_info`.
#[derive(sqlx::FromRow)]
struct ClickGeoRow {
    id: i64,
    link_id: i64,
    ip: String,
    user_agent: String,
    clicked_at: DateTime<Utc>,
    geo_ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    loc: Option<String>,
    org: Option<String>,
    postal: Option<String>,
    timezone: Option<String>,
    geo_created_at: Option<DateTime<Utc>>,
}

impl From<ClickGeoRow> for ClickWithGeo {
    fn from(row: ClickGeoRow) -> Self {
        let geo = match (row.geo_ip, row.geo_created_at) {
            (Some(ip), Some(created_at)) => Some(GeoInfo {
                click_id: row.id,
                ip,
                city: row.city,
                region: row.region,
                country: row.country,
                loc: row.loc,
                org: row.org,
                postal: row.postal,
                timezone: row.timezone,
                created_at,
            }),
            _ => None,
        };

        ClickWithGeo {
            click: Click::new(row.id, row.link_id, row.ip, row.user_agent, row.clicked_at),
            geo,
        }
    }
}

/// PostgreSQL repository for raw clicks and report queries.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError> {
        let click = sqlx::query_as::<_, Click>(
            r#"
            INSERT INTO clicks (link_id, ip, user_agent)
            VALUES ($1, $2, $3)
            RETURNING id, link_id, ip, user_agent, clicked_at
            "#,
        )
        .bind(new_click.link_id)
        .bind(&new_click.ip)
        .bind(&new_click.user_agent)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(click)
    }

    async fn query_range(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<Vec<BucketCount>, AppError> {
        // date_trunc('week') starts weeks on Monday, matching Granularity::truncate
        let rows = sqlx::query_as::<_, BucketCount>(
            r#"
            SELECT
                date_trunc($2, clicked_at AT TIME ZONE 'UTC') AT TIME ZONE 'UTC' AS bucket,
                COUNT(*) AS clicks
            FROM clicks
            WHERE link_id = $1
              AND clicked_at >= $3
              AND clicked_at <= $4
            GROUP BY bucket
            ORDER BY bucket DESC
            "#,
        )
        .bind(link_id)
        .bind(granularity.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn all_for_link(&self, link_id: i64) -> Result<Vec<Click>, AppError> {
        let clicks = sqlx::query_as::<_, Click>(
            r#"
            SELECT id, link_id, ip, user_agent, clicked_at
            FROM clicks
            WHERE link_id = $1
            ORDER BY clicked_at, id
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks)
    }

    async fn all_with_geo(&self, link_id: i64) -> Result<Vec<ClickWithGeo>, AppError> {
        let rows = sqlx::query_as::<_, ClickGeoRow>(
            r#"
            SELECT
                c.id, c.link_id, c.ip, c.user_agent, c.clicked_at,
                g.ip AS geo_ip, g.city, g.region, g.country, g.loc,
                g.org, g.postal, g.timezone, g.created_at AS geo_created_at
            FROM clicks c
            LEFT JOIN geo_info g ON g.click_id = c.id
            WHERE c.link_id = $1
            ORDER BY c.clicked_at, c.id
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ClickWithGeo::from).collect())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
