//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, geo worker spawning, and Axum
//! server lifecycle.

use crate::application::services::{
    AnalyticsService, AuthService, ClickService, GeoEnricher, LinkService,
};
use crate::config::Config;
use crate::domain::geo_worker::run_geo_worker;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geo::IpInfoClient;
use crate::infrastructure::persistence::{
    PgClickRepository, PgGeoRepository, PgLinkRepository, PgTokenRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Background geolocation worker
/// - Axum HTTP server
///
/// Stops on Ctrl+C or SIGTERM. Geolocation jobs still queued at that point
/// are dropped.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The geolocation client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let cache = connect_cache(&config).await;

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool.clone()));
    let geo_repository = Arc::new(PgGeoRepository::new(pool.clone()));
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));

    let geo_lookup = IpInfoClient::new(
        &config.geo_api_url,
        config.geo_api_token.clone(),
        Duration::from_secs(config.geo_timeout_seconds),
    )
    .context("Failed to build geolocation client")?;
    let enricher = Arc::new(GeoEnricher::new(Arc::new(geo_lookup), geo_repository));

    let (geo_tx, geo_rx) = mpsc::channel(config.geo_queue_capacity);
    tokio::spawn(run_geo_worker(
        geo_rx,
        enricher,
        config.geo_worker_concurrency,
    ));
    tracing::info!(
        capacity = config.geo_queue_capacity,
        concurrency = config.geo_worker_concurrency,
        "Geo worker started"
    );

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            link_repository,
            cache.clone(),
            config.redirect_base_url.clone(),
        )),
        click_service: Arc::new(ClickService::new(click_repository.clone(), geo_tx)),
        analytics_service: Arc::new(AnalyticsService::new(click_repository)),
        auth_service: Arc::new(AuthService::new(
            token_repository,
            user_repository,
            config.token_signing_secret.clone(),
        )),
        cache,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state)?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
