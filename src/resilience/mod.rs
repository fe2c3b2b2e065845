//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce the upstream deadline)
//!     → On expiry: the in-flight call is dropped, caller gets 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - One deadline for all routes, fixed at startup
//! - No retries and no circuit breaking: each failure is terminal for its request

pub mod timeouts;

pub use timeouts::UpstreamDeadline;
