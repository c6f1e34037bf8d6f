//! ipinfo.io compatible geolocation client.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::entities::GeoLookupResult;
use crate::domain::geo_lookup::GeoLookup;
use crate::error::AppError;

/// Subset of the provider payload that is persisted.
///
/// Unknown fields are ignored; missing ones stay `None`.
#[derive(Debug, Deserialize)]
struct IpInfoPayload {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    loc: Option<String>,
    org: Option<String>,
    postal: Option<String>,
    timezone: Option<String>,
}

impl From<IpInfoPayload> for GeoLookupResult {
    fn from(payload: IpInfoPayload) -> Self {
        Self {
            city: payload.city,
            region: payload.region,
            country: payload.country,
            loc: payload.loc,
            org: payload.org,
            postal: payload.postal,
            timezone: payload.timezone,
        }
    }
}

/// Parses a provider response body.
fn parse_payload(body: &str) -> Result<GeoLookupResult, AppError> {
    serde_json::from_str::<IpInfoPayload>(body)
        .map(GeoLookupResult::from)
        .map_err(|e| {
            AppError::upstream(
                "Malformed geolocation payload",
                json!({ "reason": e.to_string() }),
            )
        })
}

/// HTTP client for `GET {base_url}/{ip}/json`.
pub struct IpInfoClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl IpInfoClient {
    /// Builds a client with a per-request timeout.
    ///
    /// `token` is appended as the `token` query parameter when present.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("link-analytics/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for geolocation lookups")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn lookup_url(&self, ip: IpAddr) -> String {
        let url = format!("{}/{}/json", self.base_url, ip);
        match &self.token {
            Some(token) => {
                let token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
                format!("{url}?token={token}")
            }
            None => url,
        }
    }
}

#[async_trait]
impl GeoLookup for IpInfoClient {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoLookupResult, AppError> {
        let response = self
            .client
            .get(self.lookup_url(ip))
            .send()
            .await
            .map_err(|e| {
                AppError::upstream("Geolocation request failed", json!({ "reason": e.to_string() }))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::upstream(
                "Geolocation provider returned an error",
                json!({ "status": status.as_u16() }),
            ));
        }

        let body = response.text().await.map_err(|e| {
            AppError::upstream("Geolocation response unreadable", json!({ "reason": e.to_string() }))
        })?;

        debug!(%ip, "Geolocation lookup succeeded");
        parse_payload(&body)
    }
}
