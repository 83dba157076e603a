//! `ClientIp` extractor: resolves the caller's address.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use sessionward_core::error::AppError;

use crate::error::ApiError;

/// Reverse proxies allowed to report the client address in headers.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<Vec<IpAddr>>);

impl TrustedProxies {
    pub fn new(proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        Self(Arc::new(proxies.into_iter().collect()))
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }
}

/// The client IP bound into access tokens.
///
/// The socket peer is authoritative. Only when the peer is a trusted proxy
/// are forwarding headers consulted: the right-most `X-Forwarded-For` hop
/// that is not itself a trusted proxy, else `X-Real-IP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
    TrustedProxies: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or_else(|| ApiError(AppError::validation("Unable to determine client address")))?;

        let proxies = TrustedProxies::from_ref(state);
        if !proxies.contains(&peer) {
            return Ok(Self(peer));
        }

        Ok(Self(forwarded_client(&parts.headers, &proxies).unwrap_or(peer)))
    }
}

fn forwarded_client(headers: &HeaderMap, proxies: &TrustedProxies) -> Option<IpAddr> {
    if let Some(chain) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let hops = chain
            .split(',')
            .map(|hop| hop.trim().parse::<IpAddr>())
            .collect::<Result<Vec<_>, _>>()
            .ok()?;

        return hops
            .iter()
            .rev()
            .find(|hop| !proxies.contains(hop))
            .or(hops.first())
            .copied();
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
