//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON in production)
//!     → Metrics endpoint (Prometheus scrape of GET /metrics)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through logs and upstream requests
//! - Metrics are cheap (atomic increments); without a recorder they are no-ops

pub mod logging;
pub mod metrics;
