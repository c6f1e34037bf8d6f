//! Rate limiting middleware using token bucket algorithm.

use anyhow::Context;
use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};

use crate::utils::client_ip::client_ip;

type ClientIpGovernorLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Keys rate limits by visitor IP.
///
/// Uses the socket peer address, or the proxy headers understood by
/// [`client_ip`] when the service runs behind a trusted reverse proxy.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = String;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr)
            .ok_or(GovernorError::UnableToExtractKey)?;

        Ok(client_ip(req.headers(), peer, self.behind_proxy).to_string())
    }
}

fn build(behind_proxy: bool, per_second: u64, burst: u32) -> anyhow::Result<ClientIpGovernorLayer> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst)
        .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
        .finish()
        .context("Invalid rate limiter configuration")?;

    Ok(GovernorLayer::new(Arc::new(governor_conf)))
}

/// Creates a rate limiter for public endpoints (redirects, health).
///
/// # Limits
///
/// - **Rate**: 50 requests per second
/// - **Burst**: 200 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer(behind_proxy: bool) -> anyhow::Result<ClientIpGovernorLayer> {
    build(behind_proxy, 50, 200)
}

/// Creates a stricter rate limiter for authenticated API endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
pub fn secure_layer(behind_proxy: bool) -> anyhow::Result<ClientIpGovernorLayer> {
    build(behind_proxy, 2, 100)
}
