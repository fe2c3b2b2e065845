//! Request pipeline: rate limiter → auth gate → forwarder.
//!
//! Every stage returns a value; the first rejection becomes the response and
//! nothing after it runs. Unroutable paths are answered with 404 before
//! credentials are looked at, since nothing would be forwarded anyway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request},
    response::{IntoResponse, Response},
};

use crate::config::GatewayConfig;
use crate::error::{docs_url, GatewayError, ProxyError};
use crate::http::forward::{build_client, Forwarder};
use crate::observability::metrics;
use crate::resilience::UpstreamDeadline;
use crate::routing::{RouteTable, Upstream};
use crate::security::access_control::{AuthGate, AuthSetupError};
use crate::security::rate_limit::SlidingWindowLimiter;

/// The composed gateway filters around the forwarder.
pub struct Pipeline {
    limiter: Arc<SlidingWindowLimiter>,
    auth: AuthGate,
    routes: RouteTable,
    forwarder: Forwarder,
    docs_base_url: String,
}

impl Pipeline {
    pub fn new(
        limiter: Arc<SlidingWindowLimiter>,
        auth: AuthGate,
        routes: RouteTable,
        forwarder: Forwarder,
        docs_base_url: impl Into<String>,
    ) -> Self {
        Self {
            limiter,
            auth,
            routes,
            forwarder,
            docs_base_url: docs_base_url.into(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, AuthSetupError> {
        Ok(Self::new(
            Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit)),
            AuthGate::from_config(&config.auth)?,
            RouteTable::from_config(config),
            Forwarder::new(build_client(), UpstreamDeadline::from_config(&config.timeouts)),
            config.auth.docs_base_url.clone(),
        ))
    }

    pub fn limiter(&self) -> &SlidingWindowLimiter {
        &self.limiter
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Run `request` from `client_id` through the pipeline.
    pub async fn handle(&self, client_id: &str, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let upstream = self.routes.resolve(request.uri().path());

        let response = match self.dispatch(client_id, upstream, request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        };

        metrics::record_request(
            method.as_str(),
            response.status().as_u16(),
            upstream.map_or("none", |u| u.service.as_str()),
            start,
        );
        response
    }

    /// The pipeline proper; each stage may end the request.
    pub async fn process(
        &self,
        client_id: &str,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        let upstream = self.routes.resolve(request.uri().path());
        self.dispatch(client_id, upstream, request).await
    }

    /// Stages after the route lookup; `upstream` is the lookup result for
    /// the request path.
    async fn dispatch(
        &self,
        client_id: &str,
        upstream: Option<&Upstream>,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        if !self.limiter.allow(client_id, Instant::now()) {
            return Err(GatewayError::RateLimitExceeded {
                limit: self.limiter.max_requests(),
                docs_url: docs_url(&self.docs_base_url, "RATE_LIMIT_EXCEEDED"),
            });
        }

        let path = request.uri().path();
        let Some(upstream) = upstream else {
            tracing::warn!(path = %path, "No route matched");
            return Err(ProxyError::RouteNotFound {
                path: path.to_string(),
            }
            .into());
        };

        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let outcome = self
            .auth
            .authenticate(path, authorization)
            .map_err(|failure| GatewayError::Unauthorized {
                failure,
                docs_url: docs_url(&self.docs_base_url, "UNAUTHORIZED"),
            })?;

        Ok(self
            .forwarder
            .forward_to(upstream, request, outcome.context())
            .await?)
    }
}
