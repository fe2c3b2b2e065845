//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router: health probes, metrics, pipeline fallback
//! - Wire up middleware (tracing, CORS; request ID on the gateway's own routes)
//! - Serve with peer addresses so the limiter can key on them
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{Layer, ServiceExt};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{CorsConfig, GatewayConfig};
use crate::health;
use crate::http::pipeline::Pipeline;
use crate::http::request::{client_id, request_id, X_REQUEST_ID};
use crate::lifecycle::shutdown::notified;
use crate::observability::metrics;
use crate::security::access_control::AuthSetupError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Build every pipeline stage from `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, AuthSetupError> {
        let pipeline = Arc::new(Pipeline::from_config(&config)?);
        let metrics = if config.observability.metrics_enabled {
            metrics::install_recorder()
        } else {
            None
        };

        tracing::info!(
            routes = pipeline.routes().len(),
            rate_limit = pipeline.limiter().max_requests(),
            metrics = metrics.is_some(),
            "Gateway pipeline ready"
        );

        let router = Self::build_router(&config.cors, AppState { pipeline, metrics });
        Ok(Self { router, config })
    }

    fn build_router(cors: &CorsConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health/live", get(health::live))
            .route("/health/ready", get(health::ready));
        if state.metrics.is_some() {
            router = router.route("/metrics", get(metrics_handler));
        }

        // Request IDs are for the gateway's own routes only; proxied traffic
        // reaches the upstream and the caller without added headers.
        router
            .route_layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .route_layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .fallback(gateway_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                cors_layer(cors),
                cors_for_browsers,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Listening for connections");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(notified(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Everything that is not a probe goes through the pipeline.
async fn gateway_handler(State(state): State<AppState>, request: Request) -> Response {
    let client = client_id(request.extensions());
    tracing::debug!(
        request_id = %request_id(request.headers()),
        client = %client,
        method = %request.method(),
        path = %request.uri().path(),
        "Gateway request"
    );
    state.pipeline.handle(&client, request).await
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => {
            handle.run_upkeep();
            handle.render().into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Wildcard origins mirror the caller's origin so credentials remain allowed.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring CORS origin that is not a header value");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Apply CORS only to browser requests; other responses pass through as the
/// upstream sent them.
async fn cors_for_browsers(
    State(cors): State<CorsLayer>,
    request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(ORIGIN) {
        return next.run(request).await;
    }
    match cors.layer(next).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}
