//! Request inspection helpers.
//!
//! # Responsibilities
//! - Identify the client for rate limiting (direct peer address)
//! - Read the request ID assigned by the request-id layer

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, HeaderName};

use crate::security::rate_limit::UNKNOWN_CLIENT;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Rate-limit key: the peer IP, or the shared sentinel when the server was
/// not started with connect info.
///
/// Forwarded-for headers are ignored.
pub fn client_id(extensions: &Extensions) -> String {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_id_uses_peer_ip() {
        let mut extensions = Extensions::new();
        assert_eq!(client_id(&extensions), UNKNOWN_CLIENT);

        extensions.insert(ConnectInfo("10.1.2.3:55012".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_id(&extensions), "10.1.2.3");
    }

    #[test]
    fn test_request_id() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }
}
