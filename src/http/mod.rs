//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, CORS)
//!     → request.rs (client identifier from the peer address)
//!     → pipeline.rs (rate limit → route → auth gate)
//!     → forward.rs (upstream call under the deadline)
//!     → upstream response relayed as-is
//! ```

pub mod forward;
pub mod pipeline;
pub mod request;
pub mod server;

pub use forward::{build_client, Forwarder, HttpClient};
pub use pipeline::Pipeline;
pub use request::{client_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
