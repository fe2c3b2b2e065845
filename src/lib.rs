//! FleetBite API gateway library.
//!
//! Single entry point in front of the FleetBite backend services: every
//! request is rate limited per client, authenticated with a bearer token
//! unless its path is excluded, and forwarded by path prefix to one upstream.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, ProxyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
