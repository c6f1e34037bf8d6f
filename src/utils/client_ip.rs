//! Client address and user agent extraction for click recording.

use axum::http::{HeaderMap, header};
use std::net::{IpAddr, SocketAddr};

/// User agent stored when the request carries none.
pub const UNKNOWN_USER_AGENT: &str = "unknown";

const PROXY_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Determines the visitor IP for a request.
///
/// When `behind_proxy` is set, the first header among `CF-Connecting-IP`,
/// `X-Forwarded-For` and `X-Real-IP` that holds a parseable address wins.
/// For `X-Forwarded-For` the leftmost parseable entry is used. Entries that
/// are not IP addresses are skipped. Otherwise, or when no header yields an
/// address, the socket peer address is returned.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
/// assert_eq!(client_ip(&headers, peer, true).to_string(), "203.0.113.7");
/// assert_eq!(client_ip(&headers, peer, false).to_string(), "10.0.0.1");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> IpAddr {
    if behind_proxy {
        for name in PROXY_HEADERS {
            let forwarded = headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').find_map(|s| s.trim().parse::<IpAddr>().ok()));

            if let Some(ip) = forwarded {
                return ip;
            }
        }
    }

    peer.ip()
}

/// Returns the request user agent, or [`UNKNOWN_USER_AGENT`].
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(UNKNOWN_USER_AGENT)
        .to_string()
}
