//! Timeout enforcement.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Expiry drops the wrapped future, aborting the upstream call

use std::future::Future;
use std::time::Duration;

use tokio::time::error::Elapsed;

use crate::config::TimeoutConfig;

/// Deadline applied to every upstream call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpstreamDeadline {
    secs: f64,
    duration: Duration,
}

impl UpstreamDeadline {
    /// Convert once at startup. Values no `Duration` can hold (rejected by
    /// config validation) never expire.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            secs,
            duration: Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX),
        }
    }

    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self::from_secs_f64(config.upstream_secs)
    }

    /// Configured value, as written by the operator.
    pub fn secs(&self) -> f64 {
        self.secs
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Run `fut`, giving up once the deadline passes.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Elapsed>
    where
        F: Future,
    {
        tokio::time::timeout(self.duration(), fut).await
    }
}
