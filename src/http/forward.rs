//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the upstream URL from the route's base URL and the original path/query
//! - Relay method, headers and body; add verified identity headers
//! - Bound the call by the upstream deadline
//! - Map transport failures to gateway errors
//! - Relay the upstream response untouched
//!
//! # Design Decisions
//! - One pooled client shared by all requests
//! - Bodies are streamed in both directions, never buffered here
//! - No retries: the first failure is the answer

use axum::{
    body::Body,
    http::{Request, Uri},
    response::Response,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::ProxyError;
use crate::observability::metrics;
use crate::resilience::UpstreamDeadline;
use crate::routing::{RouteTable, Upstream};
use crate::security::access_control::AuthContext;
use crate::security::headers::upstream_headers;

/// Shared outbound client.
pub type HttpClient = Client<HttpConnector, Body>;

pub fn build_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Issues upstream calls for resolved routes.
#[derive(Clone)]
pub struct Forwarder {
    client: HttpClient,
    deadline: UpstreamDeadline,
}

impl Forwarder {
    pub fn new(client: HttpClient, deadline: UpstreamDeadline) -> Self {
        Self { client, deadline }
    }

    pub fn deadline(&self) -> UpstreamDeadline {
        self.deadline
    }

    /// Resolve the upstream for `request` in `routes` and forward to it.
    pub async fn forward(
        &self,
        routes: &RouteTable,
        request: Request<Body>,
        identity: Option<&AuthContext>,
    ) -> Result<Response, ProxyError> {
        let path = request.uri().path();
        let upstream = routes
            .resolve(path)
            .ok_or_else(|| ProxyError::RouteNotFound {
                path: path.to_string(),
            })?;
        self.forward_to(upstream, request, identity).await
    }

    /// Forward `request` to an already resolved upstream.
    pub async fn forward_to(
        &self,
        upstream: &Upstream,
        request: Request<Body>,
        identity: Option<&AuthContext>,
    ) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let target = upstream.target_url(parts.uri.path(), parts.uri.query());

        let uri: Uri = target.parse().map_err(|e| {
            tracing::error!(upstream = %target, error = %e, "Upstream URL is not a valid URI");
            ProxyError::UpstreamFailed {
                upstream: upstream.service.clone(),
            }
        })?;

        tracing::info!(
            method = %parts.method,
            path = %parts.uri.path(),
            upstream = %target,
            user_id = identity.and_then(AuthContext::subject),
            "Proxying request"
        );

        let mut outbound = Request::new(body);
        *outbound.method_mut() = parts.method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = upstream_headers(&parts.headers, identity);

        // Dropping this future (client disconnect or deadline) aborts the call.
        match self.deadline.run(self.client.request(outbound)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) if e.is_connect() => {
                tracing::error!(upstream = %target, error = %e, "Upstream unavailable");
                metrics::record_upstream_error("unavailable");
                Err(ProxyError::UpstreamUnreachable {
                    upstream: upstream.service.clone(),
                })
            }
            Ok(Err(e)) => {
                tracing::error!(upstream = %target, error = %e, "Upstream request failed");
                metrics::record_upstream_error("failed");
                Err(ProxyError::UpstreamFailed {
                    upstream: upstream.service.clone(),
                })
            }
            Err(_) => {
                tracing::error!(
                    upstream = %target,
                    timeout_secs = self.deadline.secs(),
                    "Upstream timeout"
                );
                metrics::record_upstream_error("timeout");
                Err(ProxyError::UpstreamTimeout {
                    upstream: upstream.service.clone(),
                    timeout_secs: self.deadline.secs(),
                })
            }
        }
    }
}
