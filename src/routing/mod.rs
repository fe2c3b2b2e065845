//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (ordered route lookup)
//!     → matcher.rs (string prefix test)
//!     → Return: matched Upstream or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[] + services
//!     → Keep configuration order
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::{RouteTable, Upstream};
