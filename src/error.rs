//! Gateway error taxonomy and its HTTP rendering.
//!
//! Every failure a request can meet in the pipeline is an expected outcome
//! with one status code and one stable machine-readable `code`. Handlers
//! return these as values; `IntoResponse` turns them into
//! `{"error":{"code":..,"message":..,"docs_url":..}}` bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::security::access_control::AuthFailure;

/// Failures produced while resolving and calling an upstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProxyError {
    #[error("No upstream service registered for path: {path}")]
    RouteNotFound { path: String },

    #[error("Upstream service timed out after {}s.", display_secs(.timeout_secs))]
    UpstreamTimeout { upstream: String, timeout_secs: f64 },

    #[error("Upstream service is currently unavailable.")]
    UpstreamUnreachable { upstream: String },

    /// Transport failure after the connection was established.
    #[error("Upstream request failed.")]
    UpstreamFailed { upstream: String },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ProxyError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UpstreamUnreachable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::UpstreamFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            ProxyError::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
            ProxyError::UpstreamUnreachable { .. } => "SERVICE_UNAVAILABLE",
            ProxyError::UpstreamFailed { .. } => "BAD_GATEWAY",
        }
    }
}

/// Anything the pipeline can answer instead of the upstream response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("Too many requests. Limit: {limit} req/min.")]
    RateLimitExceeded { limit: u32, docs_url: String },

    #[error("{failure}")]
    Unauthorized { failure: AuthFailure, docs_url: String },

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::Proxy(e) => e.status(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            GatewayError::Unauthorized { .. } => "UNAUTHORIZED",
            GatewayError::Proxy(e) => e.code(),
        }
    }

    fn docs_url(&self) -> Option<&str> {
        match self {
            GatewayError::RateLimitExceeded { docs_url, .. }
            | GatewayError::Unauthorized { docs_url, .. } => Some(docs_url),
            GatewayError::Proxy(_) => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    docs_url: Option<&'a str>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
                docs_url: self.docs_url(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        GatewayError::from(self).into_response()
    }
}

/// `<base>/<CODE>`, the documentation link attached to 401 and 429 bodies.
pub fn docs_url(base: &str, code: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), code)
}

/// Seconds the way operators write them in config: `10.0`, `2.5`.
fn display_secs(secs: &f64) -> String {
    format!("{secs:?}")
}
