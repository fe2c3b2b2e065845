//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment environment: development | staging | production.
    pub environment: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Bearer token verification and path exclusions.
    pub auth: AuthConfig,

    /// Per-client sliding window limits.
    pub rate_limit: RateLimitConfig,

    /// Upstream base URLs keyed by logical service name.
    pub services: BTreeMap<String, String>,

    /// Ordered prefix → service routes. First match wins.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let services = [
            ("user", "http://user-service:8001"),
            ("order", "http://order-service:8002"),
            ("inventory", "http://inventory-service:8003"),
            ("notification", "http://notification-service:8004"),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();

        let routes = [
            ("/v1/users", "user"),
            ("/v1/auth", "user"),
            ("/v1/orders", "order"),
            ("/v1/items", "inventory"),
            ("/v1/stock", "inventory"),
            ("/v1/events", "notification"),
        ]
        .into_iter()
        .map(|(prefix, service)| RouteConfig::new(prefix, service))
        .collect();

        Self {
            environment: "development".to_string(),
            listener: ListenerConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            services,
            routes,
            timeouts: TimeoutConfig::default(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Whether the gateway runs with production defaults (JSON logs).
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Token verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric secret used to verify (and, from the CLI, sign) tokens.
    #[serde(skip_serializing)]
    pub secret: String,

    /// Single accepted signing algorithm (HS256, HS384, HS512).
    pub algorithm: String,

    /// Lifetime of tokens minted by the operator CLI.
    pub token_expiry_secs: u64,

    /// Full-match path patterns that bypass authentication.
    pub excluded_paths: Vec<String>,

    /// Base URL for the `docs_url` field of 401/429 error bodies.
    pub docs_base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by the operator
            algorithm: "HS256".to_string(),
            token_expiry_secs: 3600,
            excluded_paths: [
                "/health/live",
                "/health/ready",
                "/metrics",
                "/docs",
                "/redoc",
                "/openapi.json",
                "/v1/auth/token",
                "/v1/users/register",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            docs_base_url: "https://docs.fleetbite.internal/errors".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per client inside one window.
    pub requests_per_minute: u32,

    /// Length of the trailing window in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 120,
            window_secs: 60,
        }
    }
}

/// Route configuration mapping a path prefix to a logical service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Path prefix to match (plain string prefix, case-sensitive).
    pub prefix: String,

    /// Name of an entry in `services`.
    pub service: String,
}

impl RouteConfig {
    pub fn new(prefix: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            service: service.into(),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream call timeout in seconds (fractions allowed).
    pub upstream_secs: f64,
}

impl TimeoutConfig {
    /// Upstream deadline as a `Duration`. Callers must validate first.
    pub fn upstream(&self) -> Duration {
        Duration::from_secs_f64(self.upstream_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 10.0,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `*` mirrors whatever origin the browser sends.
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec!["*".to_string()],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install the Prometheus recorder and expose `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
