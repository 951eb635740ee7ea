//! Client identity extraction.
//!
//! Resolves the caller's IP with reverse-proxy awareness: a proxy-supplied
//! `x-real-ip` wins, then the first hop of `x-forwarded-for`, then the
//! transport-level peer address. The same identity feeds audit records and
//! rate-limit bucketing, so a deployment behind a proxy limits real clients
//! rather than the proxy itself.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, header};
use std::net::SocketAddr;

/// Recorded when the client sends no user-agent header.
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Resolved client identity for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: String,
}

impl ClientInfo {
    /// Rate-limit bucket key; clients without any resolvable address share
    /// one fallback bucket.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.ip.as_deref().unwrap_or("unknown")
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

fn forwarded_first_hop(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    raw.split(',')
        .next()
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(String::from)
}

/// Extract identity from headers alone, without a transport peer.
#[must_use]
pub fn from_headers(headers: &HeaderMap) -> ClientInfo {
    let ip = header_value(headers, "x-real-ip").or_else(|| forwarded_first_hop(headers));
    let user_agent = header_value(headers, header::USER_AGENT.as_str())
        .unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string());
    ClientInfo { ip, user_agent }
}

/// Extract identity from a request, falling back to the connection's peer
/// address when no proxy header is present.
#[must_use]
pub fn from_request<B>(request: &Request<B>) -> ClientInfo {
    let mut info = from_headers(request.headers());
    if info.ip.is_none() {
        info.ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect| connect.0.ip().to_string());
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_real_ip_beats_forwarded_for() {
        let info = from_headers(&headers(&[
            ("x-real-ip", "10.0.0.9"),
            ("x-forwarded-for", "1.2.3.4, 5.6.7.8"),
        ]));
        assert_eq!(info.ip.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_forwarded_for_uses_first_hop() {
        let info = from_headers(&headers(&[("x-forwarded-for", " 1.2.3.4 , 5.6.7.8")]));
        assert_eq!(info.ip.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_peer_address_is_last_resort() {
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        let info = from_request(&request);
        assert_eq!(info.ip.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_headers_beat_peer_address() {
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        request
            .headers_mut()
            .insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        let info = from_request(&request);
        assert_eq!(info.ip.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_missing_user_agent_defaults_to_unknown() {
        let info = from_headers(&HeaderMap::new());
        assert_eq!(info.user_agent, UNKNOWN_USER_AGENT);
        assert_eq!(info.ip, None);
        assert_eq!(info.client_id(), "unknown");
    }

    #[test]
    fn test_empty_headers_are_ignored() {
        let info = from_headers(&headers(&[("x-real-ip", ""), ("user-agent", "  ")]));
        assert_eq!(info.ip, None);
        assert_eq!(info.user_agent, UNKNOWN_USER_AGENT);
    }
}
