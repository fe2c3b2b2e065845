//! Health probes.
//!
//! # Design Decisions
//! - Served beside the pipeline: never rate limited, never authenticated
//! - The gateway holds no upstream state, so readiness equals liveness

pub mod probes;

pub use probes::{live, ready, HealthResponse, SERVICE_NAME};
