//! Sliding window rate limiting keyed by client identifier.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Client identifier used when the peer address is unknown.
///
/// All such requests share one window.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Request timestamps of one client inside the trailing window.
#[derive(Debug, Default)]
pub struct RateWindow {
    timestamps: Vec<Instant>,
}

impl RateWindow {
    /// Drop timestamps at or before `now - window`.
    fn evict(&mut self, now: Instant, window: Duration) {
        self.timestamps
            .retain(|t| now.saturating_duration_since(*t) < window);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Per-client sliding window limiter.
///
/// Each client owns its own lock; the map is only touched to find or create
/// the entry, so unrelated clients never wait on each other.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, Arc<Mutex<RateWindow>>>,
    max_requests: u32,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_minute, config.window())
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Record a request from `client_id` at `now` if the window has room.
    ///
    /// Rejected requests are not recorded.
    pub fn allow(&self, client_id: &str, now: Instant) -> bool {
        let slot = self.slot(client_id);
        let mut window = slot.lock().unwrap_or_else(PoisonError::into_inner);

        window.evict(now, self.window);

        let count = window.len();
        if count >= self.max_requests as usize {
            tracing::warn!(
                client = %client_id,
                count,
                limit = self.max_requests,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited();
            return false;
        }

        window.timestamps.push(now);
        true
    }

    /// Requests from `client_id` counted inside the window ending at `now`.
    pub fn count(&self, client_id: &str, now: Instant) -> usize {
        match self.windows.get(client_id) {
            Some(slot) => {
                let mut window = slot.lock().unwrap_or_else(PoisonError::into_inner);
                window.evict(now, self.window);
                window.len()
            }
            None => 0,
        }
    }

    /// Number of client identifiers seen so far.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn slot(&self, client_id: &str) -> Arc<Mutex<RateWindow>> {
        if let Some(slot) = self.windows.get(client_id) {
            return slot.clone();
        }
        self.windows
            .entry(client_id.to_owned())
            .or_default()
            .clone()
    }
}
