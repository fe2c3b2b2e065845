//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (sliding window per client address)
//!     → access_control.rs (path exclusions, bearer token gate)
//!         → tokens.rs (signature + expiry verification)
//!     → headers.rs (strip hop-by-hop, inject verified identity)
//!     → Forward upstream
//! ```
//!
//! # Design Decisions
//! - Throttle before verifying tokens so floods never reach the verifier
//! - Fail closed: reject on any security check failure
//! - No trust in client-supplied identity headers

pub mod access_control;
pub mod headers;
pub mod rate_limit;
pub mod tokens;

pub use access_control::{AuthContext, AuthFailure, AuthGate, AuthOutcome, ExclusionSet};
pub use rate_limit::{SlidingWindowLimiter, UNKNOWN_CLIENT};
pub use tokens::{Claims, TokenError, TokenIssuer, TokenVerifier};
